//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the upstream base URL shape
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Validate mount and health paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener bind address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("upstream base URL '{url}' is invalid: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("upstream timeout must be greater than zero")]
    ZeroTimeout,

    #[error("mount prefix '{0}' must start with '/' and must not end with '/'")]
    MountPrefix(String),

    #[error("health path '{0}' must start with '/'")]
    HealthPath(String),

    #[error("route path '{0}' must not contain any of {{ }} * :")]
    RouteSyntax(String),

    #[error("metrics address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("maximum body size must be greater than zero")]
    ZeroBodyLimit,
}

/// Characters the router treats as capture or wildcard syntax.
const ROUTE_META: [char; 4] = ['{', '}', '*', ':'];

/// Check every section and collect all problems.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if let Some(base_url) = &config.upstream.base_url {
        if let Err(reason) = check_base_url(base_url) {
            errors.push(ValidationError::BaseUrl {
                url: base_url.clone(),
                reason,
            });
        }
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let prefix = &config.upstream.mount_prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        errors.push(ValidationError::MountPrefix(prefix.clone()));
    }

    if !config.upstream.health_path.starts_with('/') {
        errors.push(ValidationError::HealthPath(config.upstream.health_path.clone()));
    }

    for path in [prefix, &config.upstream.health_path] {
        if path.contains(ROUTE_META) {
            errors.push(ValidationError::RouteSyntax(path.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// The upstream connector speaks plain HTTP only.
fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;

    if url.scheme() != "http" {
        return Err(format!("scheme must be http, got '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("must not carry a query or fragment".to_string());
    }
    Ok(())
}
