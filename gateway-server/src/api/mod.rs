mod authn_middleware;
pub(crate) mod flows;
pub(crate) mod health;
mod hydra_proxy;
pub(crate) mod resources;

use crate::api::authn_middleware::authentication_middleware;
use crate::state::AppState;
use axum::{middleware, Router};
use log::info;

/// Combines all API routes into a single router
pub(super) fn router(state: &AppState) -> Router<AppState> {
    let mut root = Router::new().merge(health::router());

    if !state.config.hydra.enabled {
        return root;
    }

    if let Some(proxy) = &state.proxy {
        root = root.merge(hydra_proxy::router(proxy.clone()));
    }

    if state.config.flows.is_enabled() {
        root = root.merge(protected_routes(state));
    } else {
        info!("No flow API key configured, flow API not installed");
    }

    root.merge(resources::router(state))
}

/// Creates a router for the flow API, which requires the shared API key
fn protected_routes(state: &AppState) -> Router<AppState> {
    flows::router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        authentication_middleware,
    ))
}
