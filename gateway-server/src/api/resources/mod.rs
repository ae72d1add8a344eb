pub(crate) mod handlers;
pub(crate) mod models;

use crate::auth::{
    scope_gate, SCOPE_BALANCE_READ, SCOPE_PROFILE, SCOPE_TOKENS_READ, SCOPE_TOKENS_WRITE,
    SCOPE_USAGE_READ,
};
use crate::state::AppState;
use axum::middleware;
use axum::routing::{delete, get, post, MethodRouter};
use axum::Router;
use handlers::*;

/// Puts `route` behind a bearer token carrying `scope`
fn gated(
    state: &AppState,
    scope: &'static str,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(
        state.scope_gate(scope),
        scope_gate,
    ))
}

/// Resource operations for third-party clients holding an access token
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/oauth/userinfo",
            gated(state, SCOPE_PROFILE, get(userinfo_handler)),
        )
        .route(
            "/api/oauth/balance",
            gated(state, SCOPE_BALANCE_READ, get(balance_handler)),
        )
        .route(
            "/api/oauth/usage",
            gated(state, SCOPE_USAGE_READ, get(usage_handler)),
        )
        .route(
            "/api/oauth/tokens",
            gated(state, SCOPE_TOKENS_READ, get(list_tokens_handler)).merge(gated(
                state,
                SCOPE_TOKENS_WRITE,
                post(create_token_handler),
            )),
        )
        .route(
            "/api/oauth/tokens/{id}",
            gated(state, SCOPE_TOKENS_WRITE, delete(delete_token_handler)),
        )
}
