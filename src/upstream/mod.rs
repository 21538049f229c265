//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! OutboundRequest (method, url, filtered headers, body)
//!     → client.rs (pooled hyper client, deadline applied)
//!     → UpstreamResponse (status, content type, bytes)
//!     → or UpstreamError, tagged with a FailureKind (error.rs)
//! ```
//!
//! # Design Decisions
//! - One upstream, configured once; the base URL is injected, never read
//!   from the environment at request time
//! - Failure kinds come from error variants, not message text

pub mod client;
pub mod error;

pub use client::{OutboundRequest, UpstreamClient, UpstreamResponse};
pub use error::{FailureKind, UpstreamError};
