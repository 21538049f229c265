//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, proxy handler)
//!     → request.rs (request ID)
//!     → [routing::target builds the upstream URL]
//!     → [upstream client forwards with a deadline]
//!     → response.rs (relay, or 502/503 payload)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
