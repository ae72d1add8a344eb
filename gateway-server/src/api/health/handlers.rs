use super::checkers::{check_admin_health, check_public_health, run_health_check};
use super::models::{ComponentHealth, ComponentStatus, HealthResponse, HealthStatusType};
use crate::openapi::HEALTH_TAG;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use log::{debug, info};

/// Check the health of all components
async fn check_all_health(state: &AppState) -> HealthResponse {
    let admin_handle = tokio::spawn(run_health_check(
        "Admin",
        check_admin_health,
        state.clone(),
    ));
    let public_handle = state.proxy.is_some().then(|| {
        tokio::spawn(run_health_check(
            "Public",
            check_public_health,
            state.clone(),
        ))
    });

    let admin_status = admin_handle.await.unwrap_or_else(|e| {
        log::error!("Admin check task panicked: {e:?}");
        ComponentStatus::error("Admin check task failed")
    });

    let public_status = match public_handle {
        Some(handle) => Some(handle.await.unwrap_or_else(|e| {
            log::error!("Public check task panicked: {e:?}");
            ComponentStatus::error("Public check task failed")
        })),
        None => None,
    };

    let components = ComponentHealth {
        admin: admin_status,
        public: public_status,
    };

    let all_healthy =
        components.admin.is_ok() && components.public.as_ref().is_none_or(|p| p.is_ok());

    if !all_healthy {
        let mut issues = Vec::new();
        if !components.admin.is_ok() {
            issues.push(format!(
                "admin: {}",
                components.admin.error.as_deref().unwrap_or("unknown error")
            ));
        }
        if let Some(public) = components.public.as_ref().filter(|p| !p.is_ok()) {
            issues.push(format!(
                "public: {}",
                public.error.as_deref().unwrap_or("unknown error")
            ));
        }
        info!("Health check failed: {}", issues.join(", "));
    } else {
        debug!("Health check passed for all components");
    }

    HealthResponse {
        status: if all_healthy {
            HealthStatusType::Ok
        } else {
            HealthStatusType::Error
        },
        components,
        status_code: if all_healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        },
    }
}

/// Health check handler
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is not healthy", body = HealthResponse)
    )
)]
pub(crate) async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    check_all_health(&state).await
}

/// Ready check handler - alias to health check
#[utoipa::path(
    get,
    path = "/ready",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Service is not ready", body = HealthResponse)
    )
)]
pub(crate) async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    check_all_health(&state).await
}

/// Healthy check handler - alias to health check
#[utoipa::path(
    get,
    path = "/healthy",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is not healthy", body = HealthResponse)
    )
)]
pub(crate) async fn healthy_check(State(state): State<AppState>) -> impl IntoResponse {
    check_all_health(&state).await
}
