//! Bearer token validation for the scoped resource API.

pub mod introspector;
pub mod scope_gate;

pub use introspector::TokenIntrospector;
pub use scope_gate::{scope_gate, ScopeGate};

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use thiserror::Error;

pub const SCOPE_PROFILE: &str = "profile";
pub const SCOPE_BALANCE_READ: &str = "balance:read";
pub const SCOPE_USAGE_READ: &str = "usage:read";
pub const SCOPE_TOKENS_READ: &str = "tokens:read";
pub const SCOPE_TOKENS_WRITE: &str = "tokens:write";

/// Why a request was denied. Logged only; every variant renders the same 401.
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("introspection failed: {0}")]
    Introspection(String),
    #[error("token is not active")]
    Inactive,
    #[error("token expired")]
    Expired,
    #[error("token has no subject")]
    NoSubject,
    #[error("missing scope '{0}'")]
    MissingScope(String),
    #[error("no verified principal on request")]
    NoPrincipal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "error": "unauthorized",
            })),
        )
            .into_response()
    }
}

/// Verified caller, attached to the request by the scope gate
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub subject: String,
    pub scopes: BTreeSet<String>,
    pub client_id: Option<String>,
    pub claims: Map<String, Value>,
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .filter(|p| !p.subject.is_empty())
            .cloned()
            .ok_or(AuthError::NoPrincipal)
    }
}
