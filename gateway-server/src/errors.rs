use crate::store::StoreError;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use hydra_client::AdminError;
use serde::Serialize;
use serde_json::json;

/// Failure envelope: `{"success": false, "error": ...}`
#[derive(Debug, Clone)]
pub struct ApiError {
    pub detail: String,
    pub status_code: StatusCode,
    /// Description forwarded from the admin interface, if any
    pub description: Option<String>,
}

impl ApiError {
    /// Create a new ApiError with a detail message and status code
    pub fn new<S: ToString>(detail: S, status_code: StatusCode) -> Self {
        Self {
            detail: detail.to_string(),
            status_code,
            description: None,
        }
    }

    /// Create new Internal Server Error (500) with a detail message
    pub fn internal<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Create new Bad Request Error (400) with a detail message
    pub fn bad_request<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::BAD_REQUEST)
    }

    /// Create new Not Found Error (404) with a detail message
    pub fn not_found<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::NOT_FOUND)
    }

    /// Create new Bad Gateway (502) with a detail message
    pub fn bad_gateway<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::BAD_GATEWAY)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.detail,
        });
        if let Some(description) = self.description {
            body["error_description"] = json!(description);
        }
        (self.status_code, Json(body)).into_response()
    }
}

/// Admin failures keep the admin's status code, error and description
impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::ResponseError {
                status,
                error,
                description,
            } => Self {
                detail: error,
                status_code: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                description: Some(description),
            },
            AdminError::MissingParameter(name) => Self::bad_request(format!("missing {}", name)),
            other => {
                log::error!("Admin interface call failed: {}", other);
                Self::bad_gateway("authorization server unavailable")
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserNotFound => Self::not_found("user not found"),
            StoreError::TokenNotFound => Self::not_found("token not found"),
            StoreError::Backend(message) => {
                log::error!("Resource store failure: {}", message);
                Self::internal("internal error")
            }
        }
    }
}

/// Success envelope: `{"success": true, "data": ...}`
pub fn success<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": data,
        })),
    )
        .into_response()
}
