//! Configuration health endpoint.
//!
//! Reports whether the upstream base URL is set and what the proxy will do
//! with traffic. It never contacts the upstream and has no side effects.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::BACKEND_URL_ENV;
use crate::http::server::AppState;

/// Body of the health endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub backend_url: String,
    pub is_configured: bool,
    pub mount_prefix: String,
    pub timeout_secs: u64,
    pub message: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    let upstream = &state.upstream;

    let (backend_url, message) = match &state.backend_url {
        Some(url) => (url.to_string(), "Proxy is configured and ready".to_string()),
        None => (
            "NOT CONFIGURED".to_string(),
            format!(
                "{} environment variable is not set; proxied requests are answered with 503.",
                BACKEND_URL_ENV
            ),
        ),
    };

    Json(HealthReport {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        backend_url,
        is_configured: upstream.is_configured(),
        mount_prefix: state.mount_prefix.to_string(),
        timeout_secs: upstream.timeout().as_secs(),
        message,
    })
}
