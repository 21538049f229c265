//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, outcome
//! - `proxy_request_duration_seconds` (histogram): end-to-end latency
//! - `proxy_upstream_failures_total` (counter): failures by kind
//!
//! # Design Decisions
//! - Without an installed recorder every call is a no-op, so tests and
//!   metrics-disabled deployments pay nothing

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::upstream::FailureKind;

/// Outcome label for a relayed upstream response.
pub const OUTCOME_RELAYED: &str = "relayed";

/// Install the Prometheus recorder and its scrape listener.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished proxy request.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    metrics::histogram!(
        "proxy_request_duration_seconds",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a classified upstream failure.
pub fn record_upstream_failure(kind: FailureKind) {
    metrics::counter!("proxy_upstream_failures_total", "kind" => kind.as_str()).increment(1);
}
