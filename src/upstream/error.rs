//! Upstream failure taxonomy.
//!
//! The client layer tags each failure when it happens; nothing downstream
//! inspects error messages to find out what went wrong.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Primary classification of a failed proxy attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No upstream base URL was configured.
    Unconfigured,
    /// The deadline fired before the exchange completed.
    Timeout,
    /// No connection could be established (refused, or the host did not resolve).
    ConnectionRefused,
    /// Transport failure after the connection was up.
    NetworkError,
    /// Anything else.
    Unclassified,
}

impl FailureKind {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Unconfigured => "unconfigured",
            FailureKind::Timeout => "timeout",
            FailureKind::ConnectionRefused => "connection_refused",
            FailureKind::NetworkError => "network_error",
            FailureKind::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while forwarding a request upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream base URL is not configured")]
    Unconfigured,

    #[error("upstream request aborted after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("could not connect to upstream")]
    Connect(#[source] BoxError),

    #[error("network failure while talking to upstream")]
    Network(#[source] BoxError),

    #[error("could not build upstream request")]
    InvalidRequest(#[from] axum::http::Error),
}

impl UpstreamError {
    /// The failure kind this error maps to.
    pub fn kind(&self) -> FailureKind {
        match self {
            UpstreamError::Unconfigured => FailureKind::Unconfigured,
            UpstreamError::Timeout(_) => FailureKind::Timeout,
            UpstreamError::Connect(_) => FailureKind::ConnectionRefused,
            UpstreamError::Network(_) => FailureKind::NetworkError,
            UpstreamError::InvalidRequest(_) => FailureKind::Unclassified,
        }
    }

    /// The full error chain, outermost first, joined with `": "`.
    pub fn technical_details(&self) -> String {
        let mut details = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            details.push_str(": ");
            details.push_str(&err.to_string());
            source = err.source();
        }
        details
    }
}

impl From<hyper_util::client::legacy::Error> for UpstreamError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        if err.is_connect() {
            UpstreamError::Connect(Box::new(err))
        } else {
            UpstreamError::Network(Box::new(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Cause(&'static str);

    impl fmt::Display for Cause {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl StdError for Cause {}

    #[test]
    fn test_variant_kinds() {
        assert_eq!(UpstreamError::Unconfigured.kind(), FailureKind::Unconfigured);
        assert_eq!(UpstreamError::Timeout(Duration::from_secs(30)).kind(), FailureKind::Timeout);
        assert_eq!(
            UpstreamError::Connect(Box::new(Cause("refused"))).kind(),
            FailureKind::ConnectionRefused
        );
        assert_eq!(
            UpstreamError::Network(Box::new(Cause("reset"))).kind(),
            FailureKind::NetworkError
        );
    }

    #[test]
    fn test_invalid_request_is_unclassified() {
        let err = axum::http::Request::builder()
            .uri("http://bad host/")
            .body(())
            .unwrap_err();
        let err = UpstreamError::from(err);
        assert_eq!(err.kind(), FailureKind::Unclassified);
    }

    #[test]
    fn test_technical_details_walks_chain() {
        let err = UpstreamError::Connect(Box::new(Cause("connection refused (os error 111)")));
        assert_eq!(
            err.technical_details(),
            "could not connect to upstream: connection refused (os error 111)"
        );
    }

    #[test]
    fn test_timeout_message_names_seconds() {
        let err = UpstreamError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "upstream request aborted after 30 seconds");
    }
}
