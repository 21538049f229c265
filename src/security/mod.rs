//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → body limit layer (reject oversized bodies with 413)
//!     → headers.rs (strip transport headers before forwarding)
//!     → Pass to upstream client
//! ```
//!
//! # Design Decisions
//! - Limits are enforced before any upstream call
//! - Application headers (Authorization included) are the upstream's concern

pub mod headers;

pub use headers::forwardable_headers;
