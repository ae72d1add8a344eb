use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Represents the health status of a component or the overall service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum HealthStatusType {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "error")]
    Error,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatusType,
    pub components: ComponentHealth,
    #[serde(skip)]
    pub status_code: StatusCode,
}

/// Health status of individual components
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    /// Admin interface of the authorization server
    pub admin: ComponentStatus,
    /// Public interface, only probed while the proxy is installed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<ComponentStatus>,
}

/// Status of an individual component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    pub status: HealthStatusType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentStatus {
    pub fn ok() -> Self {
        Self {
            status: HealthStatusType::Ok,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatusType::Error,
            error: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == HealthStatusType::Ok
    }
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status_code = self.status_code;
        (status_code, Json(self)).into_response()
    }
}
