use super::models::ComponentStatus;
use crate::state::AppState;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::timeout;

pub fn check_admin_health<'a>(
    state: &'a AppState,
) -> Pin<Box<dyn Future<Output = ComponentStatus> + Send + 'a>> {
    Box::pin(async move {
        if state.mediator.health().await {
            ComponentStatus::ok()
        } else {
            ComponentStatus::error("Admin interface is not alive")
        }
    })
}

pub fn check_public_health<'a>(
    state: &'a AppState,
) -> Pin<Box<dyn Future<Output = ComponentStatus> + Send + 'a>> {
    Box::pin(async move {
        match &state.proxy {
            Some(proxy) => match proxy.health().await {
                Ok(()) => ComponentStatus::ok(),
                Err(err) => ComponentStatus::error(err),
            },
            None => ComponentStatus::error("Proxy is not installed"),
        }
    })
}

pub async fn run_health_check<F>(
    checker_name: &'static str,
    check_fn: F,
    state: AppState,
) -> ComponentStatus
where
    F: for<'a> FnOnce(&'a AppState) -> Pin<Box<dyn Future<Output = ComponentStatus> + Send + 'a>>
        + Send
        + 'static,
{
    let timeout_duration = Duration::from_secs_f64(state.config.healthcheck_timeout);
    match timeout(timeout_duration, check_fn(&state)).await {
        Ok(status) => status,
        Err(_) => ComponentStatus::error(format!(
            "{} health check timed out after {} seconds",
            checker_name, state.config.healthcheck_timeout
        )),
    }
}
