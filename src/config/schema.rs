//! Configuration schema definitions.
//!
//! All sections default, so an empty file (or no file at all) is a valid
//! starting point; the upstream base URL usually arrives from the
//! environment instead.

use serde::{Deserialize, Serialize};

/// Environment variable carrying the upstream base URL.
pub const BACKEND_URL_ENV: &str = "BACKEND_API_URL";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Upstream API and mount points.
    pub upstream: UpstreamConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Request limits.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Serve HTTPS with these PEM files when present.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Where requests are forwarded and under which paths the proxy answers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the REST API, e.g. `http://backend:8000/api`.
    /// `None` means the proxy is unconfigured and rejects traffic with 503.
    pub base_url: Option<String>,

    /// Path prefix the proxy is mounted under.
    pub mount_prefix: String,

    /// Path of the informational health endpoint.
    pub health_path: String,

    /// Bound on a single upstream exchange, in seconds.
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    /// True when a base URL was explicitly supplied.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            mount_prefix: "/api/proxy".to_string(),
            health_path: "/api/health".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
