mod checkers;
pub(crate) mod handlers;
pub(crate) mod models;

use crate::state::AppState;
use axum::{routing::get, Router};
use handlers::{health_check, healthy_check, ready_check};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/healthy", get(healthy_check))
}
