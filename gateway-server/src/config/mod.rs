use crate::config::flows::FlowsConfig;
use crate::config::hydra::HydraConfig;
use confique::Config;

pub mod flows;
pub mod hydra;

/// Env variable holding the path of the optional TOML config file
pub const CONFIG_FILE_ENV: &str = "GATEWAY_CONFIG_FILE";
const DEFAULT_CONFIG_FILE: &str = "gateway.toml";

/// Main configuration structure for the gateway
#[derive(Debug, Config, Clone, Default)]
pub struct GatewayConfig {
    /// The port the gateway will listen to (default: 8080)
    #[config(env = "GATEWAY_PORT", default = 8080)]
    pub port: u16,

    /// Timeout in seconds for each component probe of the health endpoints (default: 3.0)
    #[config(env = "GATEWAY_HEALTHCHECK_TIMEOUT", default = 3.0)]
    pub healthcheck_timeout: f64,

    /// Authorization server integration
    #[config(nested)]
    pub hydra: HydraConfig,

    /// Challenge flow API
    #[config(nested)]
    pub flows: FlowsConfig,
}

impl GatewayConfig {
    /// Loads the configuration from the environment, then the optional config file,
    /// then the defaults
    pub fn new() -> Result<Self, String> {
        let path =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let config = Self::builder()
            .env()
            .file(path)
            .load()
            .map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the gateway cannot start with
    pub fn validate(&self) -> Result<(), String> {
        if self.healthcheck_timeout.is_nan() || self.healthcheck_timeout <= 0.0 {
            return Err(format!(
                "Health check timeout must be positive, got {}",
                self.healthcheck_timeout
            ));
        }
        url::Url::parse(&self.hydra.admin_url)
            .map_err(|e| format!("Invalid admin URL '{}': {}", self.hydra.admin_url, e))?;
        Ok(())
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(
        public_mock: &wiremock::MockServer,
        admin_mock: &wiremock::MockServer,
    ) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            healthcheck_timeout: 3.0,
            hydra: HydraConfig {
                enabled: true,
                public_url: public_mock.uri(),
                admin_url: admin_mock.uri(),
                admin_timeout: 5,
                proxy_timeout: 5,
            },
            flows: FlowsConfig {
                api_key: "test_api_key".to_string(),
                remember_for: 3600,
            },
        }
    }
}
