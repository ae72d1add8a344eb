//! Redirect correction for browser-facing authorization server pages.
//!
//! The authorization server only knows its own base URL, so redirects into the login,
//! consent and logout UI point at an internal host. They are moved onto the host and
//! scheme the browser used, keeping path, query and fragment byte-identical.

use http::header::HOST;
use http::{HeaderMap, Uri};
use url::Url;

/// Redirect paths served by the resource server's UI
pub const REWRITE_PATH_PREFIXES: [&str; 3] = ["/oauth/login", "/oauth/consent", "/oauth/logout"];

pub(crate) const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Host and scheme the browser used to reach the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundOrigin {
    pub scheme: String,
    pub host: Option<String>,
}

impl InboundOrigin {
    /// Derives the origin from an inbound request.
    ///
    /// Scheme: first `X-Forwarded-Proto` entry (trimmed, lowercased), else `https` for an
    /// absolute https request URI, else `http`. Host: the `Host` header, else the URI
    /// authority.
    pub fn from_parts(headers: &HeaderMap, uri: &Uri) -> Self {
        let forwarded = headers
            .get(X_FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty());

        let scheme = forwarded.unwrap_or_else(|| {
            if uri.scheme_str() == Some("https") {
                "https".to_string()
            } else {
                "http".to_string()
            }
        });

        let host = headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| uri.authority().map(|a| a.to_string()));

        Self { scheme, host }
    }
}

fn is_rewritable_path(path: &str) -> bool {
    REWRITE_PATH_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Everything after the authority of `scheme://authority...`, taken from the raw string
fn suffix_after_authority(location: &str) -> Option<&str> {
    let (_, rest) = location.split_once("://")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(&rest[end..])
}

/// Returns the corrected `Location` value, or `None` when it must pass through as-is
pub fn rewrite_location(location: &str, origin: &InboundOrigin) -> Option<String> {
    let host = origin.host.as_deref()?;
    let parsed = Url::parse(location).ok()?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return None;
    }
    let suffix = suffix_after_authority(location)?;
    // Matched as written, dot-segments unresolved
    let raw_path = suffix.split(['?', '#']).next().unwrap_or_default();
    if !is_rewritable_path(raw_path) {
        return None;
    }
    Some(format!("{}://{}{}", origin.scheme, host, suffix))
}
