//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay upstream responses (status, body, one content type)
//! - Map upstream failures to 502 diagnostic payloads
//! - Map a missing upstream configuration to 503
//!
//! # Design Decisions
//! - Only `Content-Type` survives from the upstream response
//! - Failure payloads carry remediation hints for operators

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::BACKEND_URL_ENV;
use crate::upstream::{FailureKind, UpstreamError, UpstreamResponse};

/// Label carried by every 502 payload.
pub const PROXY_FAILURE_LABEL: &str = "Failed to proxy request";

/// Build the client-facing response from a successful upstream exchange.
pub fn relay(upstream: UpstreamResponse) -> Response {
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    response
}

/// 502 payload describing why forwarding failed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyFailure {
    pub error: &'static str,
    pub details: String,
    pub suggestions: Vec<String>,
    pub backend_configured: bool,
    pub technical_details: String,
}

impl ProxyFailure {
    /// Describe `err` for the caller. `base_url` is echoed in hints.
    pub fn new(err: &UpstreamError, base_url: &str, backend_configured: bool) -> Self {
        let technical_details = err.technical_details();

        let (details, suggestions) = match err {
            UpstreamError::Timeout(limit) => (
                format!("Backend request timed out after {} seconds.", limit.as_secs()),
                vec![
                    "Check if backend server is running".to_string(),
                    "Verify backend is reachable from the proxy host".to_string(),
                    "Check for firewall rules blocking the proxy".to_string(),
                ],
            ),
            _ => match err.kind() {
                FailureKind::ConnectionRefused => (
                    "Cannot connect to backend. Connection refused or host not found.".to_string(),
                    vec![
                        format!("Verify {} is correct: {}", BACKEND_URL_ENV, base_url),
                        "Check if backend server is running and accessible".to_string(),
                        "Verify firewall and ingress rules allow connections from the proxy".to_string(),
                        "Try accessing the backend URL directly from your browser".to_string(),
                    ],
                ),
                FailureKind::NetworkError => (
                    "Network error occurred while connecting to backend.".to_string(),
                    vec![
                        "Backend may be unreachable from the proxy's network".to_string(),
                        "Check if backend requires VPN or is on private network".to_string(),
                        "Verify firewall or VPC rules allow traffic from the proxy".to_string(),
                    ],
                ),
                _ => (technical_details.clone(), Vec::new()),
            },
        };

        Self {
            error: PROXY_FAILURE_LABEL,
            details,
            suggestions,
            backend_configured,
            technical_details,
        }
    }
}

impl IntoResponse for ProxyFailure {
    fn into_response(self) -> Response {
        (StatusCode::BAD_GATEWAY, Json(self)).into_response()
    }
}

/// 503 payload returned while no upstream base URL is configured.
#[derive(Debug, Clone, Serialize)]
pub struct Unconfigured {
    pub error: &'static str,
    pub message: String,
    pub instructions: String,
    pub example: String,
}

impl Default for Unconfigured {
    fn default() -> Self {
        Self {
            error: "Backend API URL not configured",
            message: format!("{} environment variable is not set.", BACKEND_URL_ENV),
            instructions: format!(
                "Set {} in the proxy's environment (or upstream.base_url in its config file) and restart it",
                BACKEND_URL_ENV
            ),
            example: format!("{}=http://backend:8000/api", BACKEND_URL_ENV),
        }
    }
}

impl IntoResponse for Unconfigured {
    fn into_response(self) -> Response {
        (StatusCode::SERVICE_UNAVAILABLE, Json(self)).into_response()
    }
}
