use super::models::{
    Balance, CreateTokenBody, CreatedToken, TokenSummary, Usage, UserInfo, MAX_TOKEN_NAME_LEN,
};
use crate::auth::Principal;
use crate::errors::{success, ApiError};
use crate::openapi::RESOURCES_TAG;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    response::{IntoResponse, Response},
};
use log::info;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::json;

/// Tokens returned by one listing
const TOKEN_LIST_LIMIT: usize = 100;
const TOKEN_KEY_PREFIX: &str = "sk-";
const TOKEN_KEY_LEN: usize = 48;

fn generate_key() -> String {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_KEY_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", TOKEN_KEY_PREFIX, random)
}

#[utoipa::path(
    get,
    path = "/api/oauth/userinfo",
    tag = RESOURCES_TAG,
    security(("bearer" = ["profile"])),
    responses(
        (status = 200, description = "Profile of the token subject", body = UserInfo),
        (status = 401, description = "Missing, inactive or under-scoped token"),
        (status = 404, description = "User not found")
    )
)]
pub(crate) async fn userinfo_handler(
    State(state): State<AppState>,
    principal: Principal,
) -> Response {
    match state.store.user(&principal.subject).await {
        Ok(user) => success(UserInfo::from(user)),
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/oauth/balance",
    tag = RESOURCES_TAG,
    security(("bearer" = ["balance:read"])),
    responses(
        (status = 200, description = "Quota of the token subject", body = Balance),
        (status = 401, description = "Missing, inactive or under-scoped token"),
        (status = 404, description = "User not found")
    )
)]
pub(crate) async fn balance_handler(
    State(state): State<AppState>,
    principal: Principal,
) -> Response {
    match state.store.user(&principal.subject).await {
        Ok(user) => success(Balance {
            quota: user.quota,
            used_quota: user.used_quota,
        }),
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/oauth/usage",
    tag = RESOURCES_TAG,
    security(("bearer" = ["usage:read"])),
    responses(
        (status = 200, description = "Usage counters of the token subject", body = Usage),
        (status = 401, description = "Missing, inactive or under-scoped token"),
        (status = 404, description = "User not found")
    )
)]
pub(crate) async fn usage_handler(State(state): State<AppState>, principal: Principal) -> Response {
    match state.store.user(&principal.subject).await {
        Ok(user) => success(Usage {
            request_count: user.request_count,
            used_quota: user.used_quota,
            quota: user.quota,
        }),
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Lists the subject's tokens without their keys
#[utoipa::path(
    get,
    path = "/api/oauth/tokens",
    tag = RESOURCES_TAG,
    security(("bearer" = ["tokens:read"])),
    responses(
        (status = 200, description = "At most 100 tokens", body = [TokenSummary]),
        (status = 401, description = "Missing, inactive or under-scoped token")
    )
)]
pub(crate) async fn list_tokens_handler(
    State(state): State<AppState>,
    principal: Principal,
) -> Response {
    match state
        .store
        .list_tokens(&principal.subject, TOKEN_LIST_LIMIT)
        .await
    {
        Ok(tokens) => success(
            tokens
                .into_iter()
                .map(TokenSummary::from)
                .collect::<Vec<_>>(),
        ),
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Creates a token; the key is only ever returned here
#[utoipa::path(
    post,
    path = "/api/oauth/tokens",
    tag = RESOURCES_TAG,
    security(("bearer" = ["tokens:write"])),
    request_body = CreateTokenBody,
    responses(
        (status = 200, description = "Token created", body = CreatedToken),
        (status = 400, description = "Missing or too long name"),
        (status = 401, description = "Missing, inactive or under-scoped token")
    )
)]
pub(crate) async fn create_token_handler(
    State(state): State<AppState>,
    principal: Principal,
    body: Result<Json<CreateTokenBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return ApiError::bad_request(format!("invalid request: {}", rejection.body_text()))
                .into_response()
        }
    };

    let name = body.name.trim();
    if name.is_empty() {
        return ApiError::bad_request("invalid request: token name is required").into_response();
    }
    if name.chars().count() > MAX_TOKEN_NAME_LEN {
        return ApiError::bad_request(format!(
            "token name too long (max {} characters)",
            MAX_TOKEN_NAME_LEN
        ))
        .into_response();
    }

    match state
        .store
        .create_token(&principal.subject, name, generate_key())
        .await
    {
        Ok(token) => {
            info!(
                "Created token {} for subject '{}' via client {}",
                token.id,
                principal.subject,
                principal.client_id.as_deref().unwrap_or("-")
            );
            success(CreatedToken {
                id: token.id,
                name: token.name,
                key: token.key,
            })
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/oauth/tokens/{id}",
    tag = RESOURCES_TAG,
    security(("bearer" = ["tokens:write"])),
    params(("id" = i64, Path, description = "Token id")),
    responses(
        (status = 200, description = "Token deleted"),
        (status = 400, description = "Non-numeric id"),
        (status = 401, description = "Missing, inactive or under-scoped token"),
        (status = 404, description = "No such token owned by the subject")
    )
)]
pub(crate) async fn delete_token_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.trim().parse::<i64>() else {
        return ApiError::bad_request("invalid token id").into_response();
    };

    match state.store.delete_token(&principal.subject, id).await {
        Ok(()) => {
            info!("Deleted token {} of subject '{}'", id, principal.subject);
            Json(json!({
                "success": true,
                "message": "token deleted",
            }))
            .into_response()
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}
