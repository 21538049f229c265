//! Pooled HTTP client for the upstream API.
//!
//! # Responsibilities
//! - Hold the normalized base URL and timeout injected at construction
//! - Send exactly one request per inbound request
//! - Read the upstream body in full and hand back status, content type, bytes
//! - Tag failures with a structured kind

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::UpstreamConfig;
use crate::resilience::with_deadline;
use crate::routing::UpstreamBase;
use crate::upstream::error::UpstreamError;

/// A request ready to go upstream.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// `None` sends an empty body.
    pub body: Option<Bytes>,
}

/// What came back from the upstream.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Client for the single configured upstream.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    base: Option<UpstreamBase>,
    timeout: Duration,
}

impl UpstreamClient {
    /// Build the client from validated configuration.
    pub fn new(config: &UpstreamConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            client,
            base: config.base_url.as_deref().map(UpstreamBase::new),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// The normalized base URL, if one was configured.
    pub fn base(&self) -> Option<&UpstreamBase> {
        self.base.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.base.is_some()
    }

    /// Deadline applied to each exchange.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward one request. The deadline covers connect, send, and body read.
    pub async fn send(&self, outbound: OutboundRequest) -> Result<UpstreamResponse, UpstreamError> {
        if self.base.is_none() {
            return Err(UpstreamError::Unconfigured);
        }
        with_deadline(self.timeout, self.exchange(outbound)).await
    }

    async fn exchange(&self, outbound: OutboundRequest) -> Result<UpstreamResponse, UpstreamError> {
        let mut request = Request::builder()
            .method(outbound.method)
            .uri(outbound.url)
            .body(match outbound.body {
                Some(bytes) => Body::from(bytes),
                None => Body::empty(),
            })?;
        *request.headers_mut() = outbound.headers;

        let response = self.client.request(request).await?;
        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = read_body(response.into_body()).await?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

async fn read_body(body: Incoming) -> Result<Bytes, UpstreamError> {
    axum::body::to_bytes(Body::new(body), usize::MAX)
        .await
        .map_err(|e| UpstreamError::Network(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::FailureKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client_for(base_url: Option<String>, timeout_secs: u64) -> UpstreamClient {
        UpstreamClient::new(&UpstreamConfig {
            base_url,
            timeout_secs,
            ..UpstreamConfig::default()
        })
    }

    fn get(url: String) -> OutboundRequest {
        OutboundRequest {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_unconfigured_client_refuses_to_send() {
        let client = client_for(None, 30);
        assert!(!client.is_configured());
        let err = client.send(get("http://127.0.0.1:1/".into())).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unconfigured);
    }

    #[tokio::test]
    async fn test_refused_connection_is_connect_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(Some(format!("http://{}/api", addr)), 5);
        let err = client.send(get(format!("http://{}/api/x/", addr))).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::ConnectionRefused);
    }

    #[tokio::test]
    async fn test_closed_without_response_is_network_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket.shutdown().await;
        });

        let client = client_for(Some(format!("http://{}", addr)), 5);
        let err = client.send(get(format!("http://{}/x/", addr))).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::NetworkError);
    }

    #[tokio::test]
    async fn test_malformed_url_is_unclassified() {
        let client = client_for(Some("http://backend/api".into()), 5);
        let err = client.send(get("http://back end/api/x/".into())).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unclassified);
    }

    #[tokio::test]
    async fn test_relays_status_content_type_and_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let body = r#"{"success":false}"#;
            let response = format!(
                "HTTP/1.1 404 Not Found\r\nContent-Type: application/problem+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        let client = client_for(Some(format!("http://{}", addr)), 5);
        let response = client.send(get(format!("http://{}/x/", addr))).await.unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.content_type.unwrap(), "application/problem+json");
        assert_eq!(&response.body[..], br#"{"success":false}"#);
    }
}
