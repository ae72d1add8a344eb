use crate::auth::{ScopeGate, TokenIntrospector};
use crate::config::GatewayConfig;
use crate::proxy::HydraProxy;
use crate::store::ResourceStore;
use hydra_client::{AdminType, FlowMediator, HydraAdmin};
use log::{info, warn};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub mediator: FlowMediator,
    /// Absent when the public URL is unusable or the integration is disabled
    pub proxy: Option<Arc<HydraProxy>>,
    pub store: Arc<dyn ResourceStore>,
}

impl AppState {
    pub fn new(config: &GatewayConfig, store: Arc<dyn ResourceStore>) -> Result<Self, String> {
        let admin = HydraAdmin::new(&config.hydra.admin_url, config.hydra.admin_timeout())
            .map_err(|e| format!("Failed to create admin client: {}", e))?;
        Self::with_admin(config, AdminType::Hydra(admin), store)
    }

    /// Builds the state around any admin binding, e.g. [`hydra_client::MockAdmin`]
    pub fn with_admin(
        config: &GatewayConfig,
        admin: AdminType,
        store: Arc<dyn ResourceStore>,
    ) -> Result<Self, String> {
        Ok(Self {
            config: Arc::new(config.clone()),
            mediator: FlowMediator::new(admin),
            proxy: Self::create_proxy(config)?,
            store,
        })
    }

    fn create_proxy(config: &GatewayConfig) -> Result<Option<Arc<HydraProxy>>, String> {
        if !config.hydra.enabled {
            info!("Authorization server integration disabled, proxy routes not installed");
            return Ok(None);
        }
        let Some(base_url) = config.hydra.public_base_url() else {
            warn!(
                "Invalid or missing public URL '{}', proxy routes not installed",
                config.hydra.public_url
            );
            return Ok(None);
        };

        let proxy = HydraProxy::new(base_url, config.hydra.proxy_timeout())
            .map_err(|e| format!("Failed to create proxy client: {}", e))?;
        info!(
            "Proxying authorization server public routes to {}",
            proxy.base_url()
        );
        Ok(Some(Arc::new(proxy)))
    }

    /// Gate requiring `scope`, introspecting through the admin interface
    pub fn scope_gate(&self, scope: &'static str) -> ScopeGate {
        let introspector: Arc<dyn TokenIntrospector> = Arc::new(self.mediator.clone());
        ScopeGate::new(introspector, scope)
    }

    #[cfg(test)]
    pub fn for_testing(config: &GatewayConfig) -> Self {
        let admin = HydraAdmin::new(&config.hydra.admin_url, config.hydra.admin_timeout())
            .expect("Failed to create admin client");
        Self::with_admin(
            config,
            AdminType::Hydra(admin),
            Arc::new(crate::store::InMemoryStore::new()),
        )
        .expect("Failed to create test state")
    }
}
