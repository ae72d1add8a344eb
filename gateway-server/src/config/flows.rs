use confique::Config;
use std::time::Duration;

/// Configuration for the challenge flow API used by the login UI
#[derive(Debug, Config, Clone, Default)]
pub struct FlowsConfig {
    /// API key the login UI must present. The flow API is not mounted when empty.
    #[config(env = "GATEWAY_FLOWS_API_KEY", default = "")]
    pub api_key: String,

    /// How long a remembered login or consent lasts, in seconds (default: 3600)
    #[config(env = "GATEWAY_FLOWS_REMEMBER_FOR", default = 3600)]
    pub remember_for: u64,
}

impl FlowsConfig {
    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn remember_for(&self) -> Duration {
        Duration::from_secs(self.remember_for)
    }
}
