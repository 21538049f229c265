//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (bound the whole exchange)
//!     → On expiry: UpstreamError::Timeout, classified as FailureKind::Timeout
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - Single attempt per inbound request; no retries

pub mod timeouts;

pub use timeouts::with_deadline;
