//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path + query
//!     → target.rs (strip mount prefix, rebuild upstream URL)
//!     → Return: absolute upstream URL
//! ```
//!
//! # Design Decisions
//! - A single upstream; no route table
//! - Deterministic: same input always yields the same URL
//! - Raw path bytes are reused, never decoded and re-encoded

pub mod target;

pub use target::{wildcard_segments, UpstreamBase};
