//! Upstream URL construction.
//!
//! # Rules
//! ```text
//! base  = configured URL with every trailing '/' removed
//! path  = segments joined by '/', with exactly one leading '/'
//!         and a trailing '/' appended when missing
//! query = "?" + raw query, only when the inbound query is non-empty
//! url   = base + path + query
//! ```
//!
//! The upstream framework redirects (and drops bodies) on paths without a
//! trailing slash, so the slash is always enforced.

use std::fmt;

/// Configured upstream origin plus path prefix, normalized once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamBase(String);

impl UpstreamBase {
    /// Normalize a configured base URL.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim_end_matches('/').to_string())
    }

    /// The normalized base, without trailing slashes.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the upstream URL for the given wildcard segments and raw query.
    pub fn target_url<S: AsRef<str>>(&self, segments: &[S], query: Option<&str>) -> String {
        let mut url = String::with_capacity(self.0.len() + 64);
        url.push_str(&self.0);
        url.push_str(&normalize_path(segments));

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

impl fmt::Display for UpstreamBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Join segments into a path with one leading and one trailing slash.
pub fn normalize_path<S: AsRef<str>>(segments: &[S]) -> String {
    let joined = segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/");

    let mut path = if joined.starts_with('/') {
        joined
    } else {
        format!("/{}", joined)
    };

    if !path.ends_with('/') {
        path.push('/');
    }
    path
}

/// Recover the wildcard segments that follow `mount_prefix` in a raw
/// request path.
///
/// Segments stay percent-encoded exactly as received. Returns `None` when
/// the path is not under the prefix.
pub fn wildcard_segments<'a>(path: &'a str, mount_prefix: &str) -> Option<Vec<&'a str>> {
    let rest = path.strip_prefix(mount_prefix)?;
    let rest = rest.strip_prefix('/')?;
    Some(rest.split('/').collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_trailing_slashes_collapsed() {
        let base = UpstreamBase::new("http://host/api///");
        assert_eq!(base.as_str(), "http://host/api");
        assert_eq!(base.target_url(&["a", "b"], None), "http://host/api/a/b/");
    }

    #[test]
    fn test_no_duplicate_trailing_slash() {
        let base = UpstreamBase::new("http://host/api");
        assert_eq!(base.target_url(&["users", "42", ""], None), "http://host/api/users/42/");
        assert_eq!(base.target_url(&["/users/"], None), "http://host/api/users/");
    }

    #[test]
    fn test_query_appended_verbatim() {
        let base = UpstreamBase::new("http://host/api/");
        assert_eq!(
            base.target_url(&["items"], Some("x=1&y=2")),
            "http://host/api/items/?x=1&y=2"
        );
        assert_eq!(
            base.target_url(&["items"], Some("tag=a&tag=b&q=%20x")),
            "http://host/api/items/?tag=a&tag=b&q=%20x"
        );
    }

    #[test]
    fn test_empty_query_has_no_question_mark() {
        let base = UpstreamBase::new("http://host/api");
        assert_eq!(base.target_url(&["items"], Some("")), "http://host/api/items/");
        assert!(!base.target_url(&["items"], None).contains('?'));
    }

    #[test]
    fn test_scenario_user_lookup() {
        let base = UpstreamBase::new("http://backend:8000/api");
        let segments = wildcard_segments("/api/proxy/users/42", "/api/proxy").unwrap();
        assert_eq!(
            base.target_url(segments.as_slice(), Some("active=true")),
            "http://backend:8000/api/users/42/?active=true"
        );
    }

    #[test]
    fn test_wildcard_segments() {
        assert_eq!(
            wildcard_segments("/api/proxy/a/b", "/api/proxy"),
            Some(vec!["a", "b"])
        );
        assert_eq!(
            wildcard_segments("/api/proxy/a/b/", "/api/proxy"),
            Some(vec!["a", "b", ""])
        );
        assert_eq!(
            wildcard_segments("/api/proxy/phone%2Fnumbers", "/api/proxy"),
            Some(vec!["phone%2Fnumbers"])
        );
        assert_eq!(wildcard_segments("/api/proxyx/a", "/api/proxy"), None);
        assert_eq!(wildcard_segments("/other/a", "/api/proxy"), None);
    }

    #[test]
    fn test_empty_segments_yield_root() {
        assert_eq!(normalize_path::<&str>(&[]), "/");
        assert_eq!(normalize_path(&[""]), "/");
    }
}
