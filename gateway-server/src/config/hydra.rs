use confique::Config;
use std::time::Duration;
use url::Url;

/// Configuration for the authorization server integration
#[derive(Debug, Config, Clone, Default)]
pub struct HydraConfig {
    /// Enable the integration (default: false)
    #[config(env = "GATEWAY_HYDRA_ENABLED", default = false)]
    pub enabled: bool,

    /// Base URL of the public interface the browser-facing routes are proxied to.
    /// Leave empty to disable the proxy.
    #[config(env = "GATEWAY_HYDRA_PUBLIC_URL", default = "")]
    pub public_url: String,

    /// Base URL of the admin interface (default: http://127.0.0.1:4445)
    #[config(env = "GATEWAY_HYDRA_ADMIN_URL", default = "http://127.0.0.1:4445")]
    pub admin_url: String,

    /// Timeout for admin calls in seconds (default: 10)
    #[config(env = "GATEWAY_HYDRA_ADMIN_TIMEOUT", default = 10)]
    pub admin_timeout: u64,

    /// Timeout for proxied requests in seconds, 0 disables it (default: 0)
    #[config(env = "GATEWAY_HYDRA_PROXY_TIMEOUT", default = 0)]
    pub proxy_timeout: u64,
}

impl HydraConfig {
    pub fn admin_timeout(&self) -> Duration {
        Duration::from_secs(self.admin_timeout)
    }

    pub fn proxy_timeout(&self) -> Duration {
        Duration::from_secs(self.proxy_timeout)
    }

    /// Returns the public base URL when it is usable for proxying.
    ///
    /// A URL without an http(s) scheme or without a host is treated as absent.
    pub fn public_base_url(&self) -> Option<Url> {
        let raw = self.public_url.trim();
        if raw.is_empty() {
            return None;
        }
        let url = Url::parse(raw).ok()?;
        match url.scheme() {
            "http" | "https" if url.host_str().is_some_and(|h| !h.is_empty()) => Some(url),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_base_url() {
        let mut config = HydraConfig {
            public_url: "http://hydra:4444".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.public_base_url().map(|u| u.to_string()),
            Some("http://hydra:4444/".to_string())
        );

        config.public_url = "".to_string();
        assert!(config.public_base_url().is_none());

        config.public_url = "hydra:4444".to_string();
        assert!(config.public_base_url().is_none());

        config.public_url = "not a url".to_string();
        assert!(config.public_base_url().is_none());

        config.public_url = "file:///etc/hosts".to_string();
        assert!(config.public_base_url().is_none());
    }

    #[test]
    fn test_timeouts() {
        let config = HydraConfig {
            admin_timeout: 10,
            proxy_timeout: 0,
            ..Default::default()
        };
        assert_eq!(config.admin_timeout(), Duration::from_secs(10));
        assert!(config.proxy_timeout().is_zero());
    }
}
