//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap upstream calls with a deadline
//! - Cancel operations cleanly on timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the inner future aborts the
//!   request and returns its connection
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;

use crate::upstream::UpstreamError;

/// Run `call` with a deadline of `limit`.
pub async fn with_deadline<F, T>(limit: Duration, call: F) -> Result<T, UpstreamError>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(UpstreamError::Timeout(limit)),
    }
}
