//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, HeaderValue, Request, Response, StatusCode},
    Router,
};
use backend_proxy::config::GatewayConfig;
use backend_proxy::http::HttpServer;
use backend_proxy::lifecycle::Shutdown;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// A request as the mock backend saw it.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct CapturedRequest {
    pub method: String,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Canned reply for the recording backend.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Reply {
    pub status: u16,
    pub body: &'static str,
    pub content_type: Option<&'static str>,
}

impl Reply {
    #[allow(dead_code)]
    pub fn json(status: u16, body: &'static str) -> Self {
        Self {
            status,
            body,
            content_type: Some("application/json"),
        }
    }
}

#[allow(dead_code)]
pub type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

/// Start a backend that records every request and answers with `reply`.
#[allow(dead_code)]
pub async fn start_recording_backend(reply: Reply) -> (SocketAddr, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let sink = sink.clone();
        let reply = reply.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = to_bytes(body, usize::MAX).await.unwrap_or_default();
            sink.lock().unwrap().push(CapturedRequest {
                method: parts.method.to_string(),
                path_and_query: parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_default(),
                headers: parts.headers,
                body,
            });

            let mut response = Response::new(Body::from(reply.body));
            *response.status_mut() = StatusCode::from_u16(reply.status).unwrap();
            if let Some(ct) = reply.content_type {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static(ct));
            }
            response
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, captured)
}

/// Start a backend that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_stalled_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// Start a backend that closes every connection without replying.
#[allow(dead_code)]
pub async fn start_hangup_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Config pointing at `backend` with a `/api` path prefix.
#[allow(dead_code)]
pub fn config_for(backend: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = Some(format!("http://{}/api/", backend));
    config.observability.metrics_enabled = false;
    config
}

/// Start the proxy on an ephemeral port.
pub async fn start_proxy(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    (addr, shutdown)
}

/// HTTP client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
