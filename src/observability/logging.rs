//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber from configuration
//! - Keep upstream addresses out of plain sight in startup logs
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - JSON format for production, text format for development

use std::net::Ipv4Addr;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::{Host, Url};

use crate::config::schema::{LogFormat, ObservabilityConfig};

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "backend_proxy={level},tower_http={level}",
            level = config.log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
    }
}

/// Mask the last octet of an IPv4 host, e.g. `http://10.1.2.***:8000/api`.
/// Other URLs are returned unchanged.
pub fn mask_url(raw: &str) -> String {
    let Ok(url) = Url::parse(raw) else {
        return raw.to_string();
    };
    match url.host() {
        Some(Host::Ipv4(ip)) => raw.replacen(&ip.to_string(), &mask_ipv4(ip), 1),
        _ => raw.to_string(),
    }
}

fn mask_ipv4(ip: Ipv4Addr) -> String {
    let [a, b, c, _] = ip.octets();
    format!("{}.{}.{}.***", a, b, c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_ipv4_host() {
        assert_eq!(mask_url("http://72.61.147.33:8888/api"), "http://72.61.147.***:8888/api");
    }

    #[test]
    fn test_hostnames_untouched() {
        assert_eq!(mask_url("http://backend:8000/api"), "http://backend:8000/api");
        assert_eq!(mask_url("garbage"), "garbage");
    }
}
