//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics in dependency order
//! - Bind the listener and serve until a termination signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)
//! - A missing upstream URL is not fatal; the proxy answers 503 until fixed

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, ConfigError, GatewayConfig, BACKEND_URL_ENV};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::load_tls_config;
use crate::observability::{logging, metrics};

/// Inputs gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// TOML configuration file.
    pub config_path: Option<PathBuf>,
    /// Overrides `listener.bind_address`.
    pub bind_address: Option<String>,
}

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("failed to install logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to load TLS material: {0}")]
    Tls(#[source] std::io::Error),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load configuration and apply command line overrides.
pub fn prepare_config(options: &StartupOptions) -> Result<GatewayConfig, StartupError> {
    let mut config = load_config(options.config_path.as_deref())?;
    if let Some(bind) = &options.bind_address {
        apply_bind_override(&mut config, bind)?;
    }
    Ok(config)
}

/// Replace the listener address with `bind` if it is a socket address.
fn apply_bind_override(config: &mut GatewayConfig, bind: &str) -> Result<(), StartupError> {
    if bind.parse::<SocketAddr>().is_err() {
        return Err(StartupError::BindAddress(bind.to_string()));
    }
    config.listener.bind_address = bind.to_string();
    Ok(())
}

/// Scrape listener address, or `None` when metrics are disabled.
fn metrics_address(config: &GatewayConfig) -> Result<Option<SocketAddr>, StartupError> {
    let observability = &config.observability;
    if !observability.metrics_enabled {
        return Ok(None);
    }
    observability
        .metrics_address
        .parse::<SocketAddr>()
        .map(Some)
        .map_err(|_| StartupError::MetricsAddress(observability.metrics_address.clone()))
}

/// Run the proxy until a termination signal arrives.
pub async fn run(options: StartupOptions) -> Result<(), StartupError> {
    let config = prepare_config(&options)?;

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "backend-proxy starting");
    log_upstream(&config);

    if let Some(addr) = metrics_address(&config)? {
        metrics::init_metrics(addr)?;
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config);
    let tls = server.config().listener.tls.clone();
    let bind_address = server.config().listener.bind_address.clone();

    match tls {
        Some(tls) => {
            let addr = bind_address
                .parse::<SocketAddr>()
                .map_err(|_| StartupError::BindAddress(bind_address.clone()))?;
            let rustls = load_tls_config(&tls).await.map_err(StartupError::Tls)?;
            server.run_tls(addr, rustls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn log_upstream(config: &GatewayConfig) {
    let upstream = &config.upstream;
    match &upstream.base_url {
        Some(url) => tracing::info!(
            backend_url = %logging::mask_url(url),
            mount_prefix = %upstream.mount_prefix,
            timeout_secs = upstream.timeout_secs,
            "Upstream configured"
        ),
        None => tracing::warn!(
            env = BACKEND_URL_ENV,
            mount_prefix = %upstream.mount_prefix,
            "Upstream base URL is not set; proxied requests will be answered with 503"
        ),
    }
}
