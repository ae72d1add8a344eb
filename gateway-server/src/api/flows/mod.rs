pub(crate) mod handlers;
pub(crate) mod models;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use handlers::*;

/// Login, consent and logout handshakes plus introspection, for the resource server's UI
pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/api/oauth/login", get(login_request_handler))
        .route("/api/oauth/login/accept", post(accept_login_handler))
        .route("/api/oauth/login/reject", post(reject_login_handler))
        .route("/api/oauth/consent", get(consent_request_handler))
        .route("/api/oauth/consent/accept", post(accept_consent_handler))
        .route("/api/oauth/consent/reject", post(reject_consent_handler))
        .route("/api/oauth/logout", get(logout_request_handler))
        .route("/api/oauth/logout/accept", post(accept_logout_handler))
        .route("/api/oauth/logout/reject", post(reject_logout_handler))
        .route("/api/oauth/introspect", post(introspect_handler))
}
