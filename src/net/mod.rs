//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Plain HTTP:  TcpListener → axum::serve
//! HTTPS:       tls.rs (load PEM files) → axum_server::bind_rustls
//! ```
//!
//! # Design Decisions
//! - TLS is optional and terminates at the proxy; the upstream hop is HTTP

pub mod tls;

pub use tls::load_tls_config;
