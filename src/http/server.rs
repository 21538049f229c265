//! HTTP server setup and the forwarding handler.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy and health routes
//! - Wire up middleware (request ID, tracing, body limit)
//! - Bind server to a plain or TLS listener
//! - Forward requests to the upstream and map the outcome
//!
//! # Request lifecycle
//! ```text
//! FORWARDING (one upstream attempt, bounded by the timeout)
//!     → RESPONDED (relayed response, 502 diagnostic, or 503 unconfigured)
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::health::health_handler;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::{relay, ProxyFailure, Unconfigured};
use crate::observability::metrics;
use crate::routing::wildcard_segments;
use crate::security::forwardable_headers;
use crate::upstream::{FailureKind, OutboundRequest, UpstreamClient, UpstreamError};

/// How long in-flight TLS connections may drain after shutdown is requested.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub mount_prefix: Arc<str>,
    /// Base URL exactly as configured, for reporting.
    pub backend_url: Option<Arc<str>>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let state = AppState {
            upstream: Arc::new(UpstreamClient::new(&config.upstream)),
            mount_prefix: Arc::from(config.upstream.mount_prefix.as_str()),
            backend_url: config.upstream.base_url.as_deref().map(Arc::from),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let proxy_route = format!("{}/{{*path}}", config.upstream.mount_prefix);

        Router::new()
            .route(&config.upstream.health_path, get(health_handler))
            .route(
                &proxy_route,
                get(proxy_handler)
                    .post(proxy_handler)
                    .put(proxy_handler)
                    .patch(proxy_handler)
                    .delete(proxy_handler),
            )
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size)),
            )
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve plain HTTP until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires, then drain.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Forward one request to the upstream and map the outcome.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();
    let request_id = request_id(&parts.headers).to_string();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    let Some(base) = state.upstream.base() else {
        tracing::error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            "Upstream base URL is not configured, rejecting request"
        );
        metrics::record_request(method.as_str(), 503, FailureKind::Unconfigured.as_str(), start_time);
        return Unconfigured::default().into_response();
    };

    let segments = wildcard_segments(&path, &state.mount_prefix).unwrap_or_default();
    let url = base.target_url(segments.as_slice(), parts.uri.query());

    let body = if carries_body(&method) {
        match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => Some(bytes),
            Err(e) if exceeds_body_limit(&e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Request body over the size limit");
                metrics::record_request(method.as_str(), 413, "payload_too_large", start_time);
                return StatusCode::PAYLOAD_TOO_LARGE.into_response();
            }
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
                metrics::record_request(method.as_str(), 400, "bad_request", start_time);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": "Failed to read request body",
                        "details": e.to_string(),
                    })),
                )
                    .into_response();
            }
        }
    } else {
        None
    };

    let headers = forwardable_headers(&parts.headers);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        url = %url,
        headers = headers.len(),
        body_len = body.as_ref().map_or(0, |b| b.len()),
        "Forwarding request"
    );

    let outbound = OutboundRequest {
        method: method.clone(),
        url,
        headers,
        body,
    };

    match state.upstream.send(outbound).await {
        Ok(upstream) => {
            tracing::debug!(
                request_id = %request_id,
                status = %upstream.status,
                body_len = upstream.body.len(),
                "Upstream responded"
            );
            metrics::record_request(
                method.as_str(),
                upstream.status.as_u16(),
                metrics::OUTCOME_RELAYED,
                start_time,
            );
            relay(upstream)
        }
        Err(err) => {
            log_failure(&request_id, &method, &path, base.as_str(), &err);
            metrics::record_upstream_failure(err.kind());
            metrics::record_request(method.as_str(), 502, err.kind().as_str(), start_time);
            ProxyFailure::new(&err, base.as_str(), state.upstream.is_configured()).into_response()
        }
    }
}

/// Write methods carry their body upstream; GET and DELETE never do.
fn carries_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// True when a streamed body ran past the `RequestBodyLimitLayer` cap.
fn exceeds_body_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

fn log_failure(request_id: &str, method: &Method, path: &str, base_url: &str, err: &UpstreamError) {
    let kind = err.kind();
    tracing::error!(
        request_id = %request_id,
        method = %method,
        path = %path,
        backend_url = %base_url,
        kind = %kind,
        is_timeout = kind == FailureKind::Timeout,
        is_connection_refused = kind == FailureKind::ConnectionRefused,
        is_network_error = kind == FailureKind::NetworkError,
        error = %err.technical_details(),
        "Failed to proxy request"
    );
}
