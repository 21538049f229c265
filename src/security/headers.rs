//! Header filtering for forwarded requests.
//!
//! # Responsibilities
//! - Copy inbound headers onto the outbound request
//! - Strip transport-level headers that would corrupt the new request framing
//!
//! # Design Decisions
//! - Header names are normalized to lowercase by `HeaderMap`, so matching is
//!   case-insensitive by construction
//! - Repeated headers are appended, never collapsed

use axum::http::header::{self, HeaderMap, HeaderName};

/// Headers owned by the inbound connection. The client recomputes them.
pub const STRIPPED_HEADERS: [HeaderName; 3] =
    [header::HOST, header::CONNECTION, header::CONTENT_LENGTH];

/// Relayed bodies leave without their `content-encoding`, so the upstream is
/// asked for identity encoding.
pub const WITHHELD_HEADERS: [HeaderName; 1] = [header::ACCEPT_ENCODING];

/// Returns true when `name` may be copied to the upstream request.
pub fn is_forwardable(name: &HeaderName) -> bool {
    !STRIPPED_HEADERS.contains(name) && !WITHHELD_HEADERS.contains(name)
}

/// Copy every forwardable header, preserving repeated values in order.
pub fn forwardable_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound.iter() {
        if is_forwardable(name) {
            outbound.append(name.clone(), value.clone());
        }
    }
    outbound
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    fn inbound(headers: &[(&str, &str)]) -> HeaderMap {
        let mut builder = Request::builder();
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap().headers().clone()
    }

    #[test]
    fn test_transport_headers_stripped_any_case() {
        let headers = inbound(&[
            ("host", "dashboard.example.com"),
            ("Host", "dashboard.example.com"),
            ("Connection", "keep-alive"),
            ("content-length", "12"),
            ("Content-Length", "12"),
        ]);

        let out = forwardable_headers(&headers);
        assert!(out.get("host").is_none());
        assert!(out.get("connection").is_none());
        assert!(out.get("content-length").is_none());
        assert!(out.is_empty());
    }

    #[test]
    fn test_application_headers_pass_through() {
        let headers = inbound(&[
            ("Authorization", "Bearer abc.def"),
            ("Content-Type", "application/json"),
            ("X-Tenant", "north"),
            ("Host", "dashboard.example.com"),
        ]);

        let out = forwardable_headers(&headers);
        assert_eq!(out.get("authorization").unwrap(), "Bearer abc.def");
        assert_eq!(out.get("content-type").unwrap(), "application/json");
        assert_eq!(out.get("x-tenant").unwrap(), "north");
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_repeated_values_preserved_in_order() {
        let headers = inbound(&[("Accept", "application/json"), ("accept", "text/plain")]);
        let out = forwardable_headers(&headers);
        let values: Vec<_> = out.get_all("accept").iter().collect();
        assert_eq!(values, vec!["application/json", "text/plain"]);
    }

    #[test]
    fn test_accept_encoding_withheld() {
        let headers = inbound(&[("Accept-Encoding", "gzip, br")]);
        assert!(forwardable_headers(&headers).is_empty());
    }
}
