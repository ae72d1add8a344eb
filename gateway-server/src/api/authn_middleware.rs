use crate::errors::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::warn;

const FORBIDDEN_DETAIL: &str = "invalid api key";

/// Guards the flow API with the shared key of the resource server's login UI
pub(super) async fn authentication_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Extract the authorization header
    let Some(auth_header) = request.headers().get(http::header::AUTHORIZATION) else {
        warn!("Missing Authorization header");
        return ApiError::new("missing authorization header", StatusCode::UNAUTHORIZED)
            .into_response();
    };

    // Extract the key from the authorization header
    let api_key = match auth_header.to_str() {
        Ok(header_str) if header_str.len() > 7 && header_str[..7].eq_ignore_ascii_case("bearer ") => {
            header_str[7..].trim()
        }
        Ok(_) => {
            warn!("Invalid Authorization header format, missing 'Bearer ' prefix");
            return ApiError::new(FORBIDDEN_DETAIL, StatusCode::FORBIDDEN).into_response();
        }
        Err(e) => {
            warn!("Failed to parse Authorization header to string: {}", e);
            return ApiError::new(FORBIDDEN_DETAIL, StatusCode::FORBIDDEN).into_response();
        }
    };

    // Verify the API key
    if api_key != state.config.flows.api_key {
        warn!("Authentication failed: Invalid API key");
        return ApiError::new(FORBIDDEN_DETAIL, StatusCode::FORBIDDEN).into_response();
    }
    next.run(request).await
}
