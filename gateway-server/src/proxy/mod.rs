//! Streaming reverse proxy in front of the authorization server's public interface.

pub mod redirect;

use crate::proxy::redirect::{rewrite_location, InboundOrigin, X_FORWARDED_PROTO};
use axum::{
    body::{Body, HttpBody},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use http::header::{
    HeaderName, CONNECTION, HOST, LOCATION, PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION, TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use http::{HeaderMap, HeaderValue, Uri};
use log::{debug, error, info};
use reqwest::Client;
use std::time::Duration;
use url::Url;

const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Headers that describe a single connection and are never forwarded
const HOP_BY_HOP: [HeaderName; 7] = [
    CONNECTION,
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
    TE,
    TRAILER,
    TRANSFER_ENCODING,
    UPGRADE,
];

fn is_hop_by_hop(name: &HeaderName, connection_tokens: &[String]) -> bool {
    HOP_BY_HOP.contains(name)
        || name.as_str() == "keep-alive"
        || name.as_str() == "proxy-connection"
        || connection_tokens.iter().any(|t| t == name.as_str())
}

/// Header names listed in `Connection`, which are hop-by-hop as well
fn connection_tokens(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Copies end-to-end headers, keeping repeated values
fn end_to_end_headers(source: &HeaderMap, skip_host: bool) -> HeaderMap {
    let tokens = connection_tokens(source);
    let mut headers = HeaderMap::with_capacity(source.len());
    for (name, value) in source {
        if is_hop_by_hop(name, &tokens) || (skip_host && name == HOST) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

/// Decided from the body itself, HTTP/2 requests may carry neither length nor coding
fn has_body(body: &Body) -> bool {
    !body.is_end_stream() && body.size_hint().exact() != Some(0)
}

/// Forwards browser-facing requests to the public interface and corrects redirects
#[derive(Debug, Clone)]
pub struct HydraProxy {
    base_url: Url,
    client: Client,
}

impl HydraProxy {
    /// A zero `timeout` leaves proxied requests unbounded
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(2))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Some(Duration::from_secs(90)));
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url,
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins the base URL's path with the inbound path and query
    pub fn upstream_url(&self, uri: &Uri) -> Url {
        let mut url = self.base_url.clone();
        let base_path = self.base_url.path().trim_end_matches('/');
        url.set_path(&format!("{}{}", base_path, uri.path()));

        let query = match (self.base_url.query(), uri.query()) {
            (Some(base), Some(inbound)) if !base.is_empty() => Some(format!("{}&{}", base, inbound)),
            (_, Some(inbound)) => Some(inbound.to_string()),
            (base, None) => base.map(str::to_string),
        };
        url.set_query(query.as_deref().filter(|q| !q.is_empty()));
        url.set_fragment(None);
        url
    }

    /// Checks the public interface readiness probe
    pub async fn health(&self) -> Result<(), String> {
        let url = self.upstream_url(&Uri::from_static("/health/ready"));
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => Err(format!("public interface returned status {}", response.status())),
            Err(e) => Err(format!("Failed to connect to public interface: {}", e)),
        }
    }

    /// Forwards one request, streaming both bodies.
    ///
    /// Dropping the returned future drops the upstream call with it.
    pub async fn forward(&self, request: Request<Body>) -> Response {
        let (parts, body) = request.into_parts();
        let origin = InboundOrigin::from_parts(&parts.headers, &parts.uri);
        let url = self.upstream_url(&parts.uri);

        let mut headers = end_to_end_headers(&parts.headers, true);
        if let Some(host) = origin.host.as_deref() {
            if let Ok(value) = HeaderValue::from_str(host) {
                headers.insert(X_FORWARDED_HOST, value);
            }
        }
        if let Ok(value) = HeaderValue::from_str(&origin.scheme) {
            headers.insert(X_FORWARDED_PROTO, value);
        }

        debug!("Forwarding request to authorization server: {} {}", parts.method, url);
        let mut upstream = self
            .client
            .request(parts.method.clone(), url.clone())
            .headers(headers);
        if has_body(&body) {
            upstream = upstream.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let response = match upstream.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Authorization server proxy error: {} {} -> {}", parts.method, url, e);
                return (StatusCode::BAD_GATEWAY, "bad gateway").into_response();
            }
        };

        let status = response.status();
        let mut response_headers = end_to_end_headers(response.headers(), false);
        if status.is_redirection() {
            self.correct_location(&mut response_headers, &origin);
        }

        let mut proxied = Response::new(Body::from_stream(response.bytes_stream()));
        *proxied.status_mut() = status;
        *proxied.headers_mut() = response_headers;
        proxied
    }

    fn correct_location(&self, headers: &mut HeaderMap, origin: &InboundOrigin) {
        let Some(location) = headers
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
        else {
            return;
        };
        let Some(rewritten) = rewrite_location(&location, origin) else {
            return;
        };
        match HeaderValue::from_str(&rewritten) {
            Ok(value) => {
                info!("Authorization server redirect rewritten: {} -> {}", location, rewritten);
                headers.insert(LOCATION, value);
            }
            Err(e) => debug!("Keeping original redirect, rewritten value invalid: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use http_body_util::{BodyExt, Full};

    fn proxy(base: &str) -> HydraProxy {
        HydraProxy::new(Url::parse(base).unwrap(), Duration::ZERO).unwrap()
    }

    #[test]
    fn test_upstream_url_joins_paths() {
        let uri: Uri = "/oauth2/auth?client_id=a&scope=openid%20profile".parse().unwrap();

        assert_eq!(
            proxy("http://hydra:4444").upstream_url(&uri).as_str(),
            "http://hydra:4444/oauth2/auth?client_id=a&scope=openid%20profile"
        );
        assert_eq!(
            proxy("http://hydra:4444/public/").upstream_url(&uri).as_str(),
            "http://hydra:4444/public/oauth2/auth?client_id=a&scope=openid%20profile"
        );
        assert_eq!(
            proxy("http://hydra:4444/?tenant=x")
                .upstream_url(&"/.well-known/jwks.json".parse().unwrap())
                .as_str(),
            "http://hydra:4444/.well-known/jwks.json?tenant=x"
        );
    }

    #[test]
    fn test_hop_by_hop_headers_are_dropped() {
        let mut source = HeaderMap::new();
        source.insert(HOST, HeaderValue::from_static("app.example.com"));
        source.insert(CONNECTION, HeaderValue::from_static("keep-alive, x-internal"));
        source.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        source.insert("x-internal", HeaderValue::from_static("1"));
        source.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        source.append("cookie", HeaderValue::from_static("a=1"));
        source.append("cookie", HeaderValue::from_static("b=2"));

        let forwarded = end_to_end_headers(&source, true);
        assert!(!forwarded.contains_key(HOST));
        assert!(!forwarded.contains_key(CONNECTION));
        assert!(!forwarded.contains_key("keep-alive"));
        assert!(!forwarded.contains_key("x-internal"));
        assert!(!forwarded.contains_key(TRANSFER_ENCODING));
        assert_eq!(forwarded.get_all("cookie").iter().count(), 2);

        let kept = end_to_end_headers(&source, false);
        assert!(kept.contains_key(HOST));
    }

    #[test]
    fn test_has_body() {
        assert!(!has_body(&Body::empty()));
        assert!(!has_body(&Body::from("")));
        assert!(has_body(&Body::from("grant_type=client_credentials")));

        // Streamed body with no size known up front
        let streamed = Full::new(Bytes::from_static(b"a=1")).map_frame(|frame| frame);
        assert!(has_body(&Body::new(streamed)));
    }
}
