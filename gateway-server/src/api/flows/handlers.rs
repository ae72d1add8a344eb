use super::models::{
    AcceptConsentBody, AcceptLoginBody, ChallengeBody, ConsentChallengeQuery, IntrospectBody,
    LoginChallengeQuery, LogoutChallengeQuery, RejectBody,
};
use crate::errors::{success, ApiError};
use crate::openapi::FLOWS_TAG;
use crate::state::AppState;
use axum::{
    extract::{Json, Query, State},
    response::{IntoResponse, Response},
};
use hydra_client::models::ConsentSession;
use hydra_client::{AdminError, ConsentDecision, LoginDecision, Rejection};
use log::info;
use serde::Serialize;
use std::time::Duration;

fn respond<T: Serialize>(result: Result<T, AdminError>) -> Response {
    match result {
        Ok(data) => success(data),
        Err(err) => ApiError::from(err).into_response(),
    }
}

fn remember_for(state: &AppState, requested: Option<u64>) -> Duration {
    requested
        .map(Duration::from_secs)
        .unwrap_or_else(|| state.config.flows.remember_for())
}

/// Login challenge details. A challenge the authorization server marks as `skip`
/// is accepted right away and the redirect is returned instead.
#[utoipa::path(
    get,
    path = "/api/oauth/login",
    tag = FLOWS_TAG,
    params(LoginChallengeQuery),
    responses(
        (status = 200, description = "Challenge details, or `redirect_to` when the login was skipped"),
        (status = 400, description = "Missing challenge"),
        (status = 404, description = "Unknown challenge")
    )
)]
pub(crate) async fn login_request_handler(
    State(state): State<AppState>,
    Query(query): Query<LoginChallengeQuery>,
) -> Response {
    let request = match state.mediator.login_request(&query.login_challenge).await {
        Ok(request) => request,
        Err(err) => return ApiError::from(err).into_response(),
    };

    if request.skip {
        info!("Login skipped for subject '{}'", request.subject);
        let decision = LoginDecision {
            subject: request.subject,
            remember: false,
            remember_for: Duration::ZERO,
        };
        return respond(
            state
                .mediator
                .accept_login(&query.login_challenge, decision)
                .await,
        );
    }
    success(request)
}

#[utoipa::path(
    post,
    path = "/api/oauth/login/accept",
    tag = FLOWS_TAG,
    request_body = AcceptLoginBody,
    responses(
        (status = 200, description = "Redirect the browser must follow"),
        (status = 400, description = "Missing challenge or subject")
    )
)]
pub(crate) async fn accept_login_handler(
    State(state): State<AppState>,
    Json(body): Json<AcceptLoginBody>,
) -> Response {
    let decision = LoginDecision {
        subject: body.subject,
        remember: body.remember,
        remember_for: remember_for(&state, body.remember_for),
    };
    respond(
        state
            .mediator
            .accept_login(&body.login_challenge, decision)
            .await,
    )
}

#[utoipa::path(
    post,
    path = "/api/oauth/login/reject",
    tag = FLOWS_TAG,
    request_body = RejectBody,
    responses((status = 200, description = "Redirect the browser must follow"))
)]
pub(crate) async fn reject_login_handler(
    State(state): State<AppState>,
    Json(body): Json<RejectBody>,
) -> Response {
    let rejection = Rejection::new(body.error, body.error_description);
    respond(state.mediator.reject_login(&body.challenge, rejection).await)
}

/// Consent challenge details. A `skip` challenge grants what was requested.
#[utoipa::path(
    get,
    path = "/api/oauth/consent",
    tag = FLOWS_TAG,
    params(ConsentChallengeQuery),
    responses(
        (status = 200, description = "Challenge details, or `redirect_to` when consent was skipped"),
        (status = 400, description = "Missing challenge")
    )
)]
pub(crate) async fn consent_request_handler(
    State(state): State<AppState>,
    Query(query): Query<ConsentChallengeQuery>,
) -> Response {
    let request = match state.mediator.consent_request(&query.consent_challenge).await {
        Ok(request) => request,
        Err(err) => return ApiError::from(err).into_response(),
    };

    if request.skip {
        info!(
            "Consent skipped for subject '{}', granting [{}]",
            request.subject,
            request.requested_scope.join(" ")
        );
        let decision = ConsentDecision {
            grant_scope: request.requested_scope,
            grant_audience: request.requested_access_token_audience,
            ..Default::default()
        };
        return respond(
            state
                .mediator
                .accept_consent(&query.consent_challenge, decision)
                .await,
        );
    }
    success(request)
}

#[utoipa::path(
    post,
    path = "/api/oauth/consent/accept",
    tag = FLOWS_TAG,
    request_body = AcceptConsentBody,
    responses(
        (status = 200, description = "Redirect the browser must follow"),
        (status = 400, description = "Missing challenge")
    )
)]
pub(crate) async fn accept_consent_handler(
    State(state): State<AppState>,
    Json(body): Json<AcceptConsentBody>,
) -> Response {
    let (grant_scope, grant_audience) = match (body.grant_scope, body.grant_audience) {
        (Some(scope), Some(audience)) => (scope, audience),
        (scope, audience) => {
            // Fill what the caller left out from the pending request
            let request = match state.mediator.consent_request(&body.consent_challenge).await {
                Ok(request) => request,
                Err(err) => return ApiError::from(err).into_response(),
            };
            (
                scope.unwrap_or(request.requested_scope),
                audience.unwrap_or(request.requested_access_token_audience),
            )
        }
    };

    let decision = ConsentDecision {
        grant_scope,
        grant_audience,
        remember: body.remember,
        remember_for: remember_for(&state, body.remember_for),
        session: body.session.map(|s| ConsentSession {
            access_token: s.access_token,
            id_token: s.id_token,
        }),
    };
    respond(
        state
            .mediator
            .accept_consent(&body.consent_challenge, decision)
            .await,
    )
}

#[utoipa::path(
    post,
    path = "/api/oauth/consent/reject",
    tag = FLOWS_TAG,
    request_body = RejectBody,
    responses((status = 200, description = "Redirect the browser must follow"))
)]
pub(crate) async fn reject_consent_handler(
    State(state): State<AppState>,
    Json(body): Json<RejectBody>,
) -> Response {
    let rejection = Rejection::new(body.error, body.error_description);
    respond(state.mediator.reject_consent(&body.challenge, rejection).await)
}

#[utoipa::path(
    get,
    path = "/api/oauth/logout",
    tag = FLOWS_TAG,
    params(LogoutChallengeQuery),
    responses(
        (status = 200, description = "Logout challenge details"),
        (status = 400, description = "Missing challenge")
    )
)]
pub(crate) async fn logout_request_handler(
    State(state): State<AppState>,
    Query(query): Query<LogoutChallengeQuery>,
) -> Response {
    respond(state.mediator.logout_request(&query.logout_challenge).await)
}

#[utoipa::path(
    post,
    path = "/api/oauth/logout/accept",
    tag = FLOWS_TAG,
    request_body = ChallengeBody,
    responses((status = 200, description = "Redirect the browser must follow"))
)]
pub(crate) async fn accept_logout_handler(
    State(state): State<AppState>,
    Json(body): Json<ChallengeBody>,
) -> Response {
    respond(state.mediator.accept_logout(&body.challenge).await)
}

/// The authorization server sends no redirect for a refused logout, so `data` may be null
#[utoipa::path(
    post,
    path = "/api/oauth/logout/reject",
    tag = FLOWS_TAG,
    request_body = RejectBody,
    responses((status = 200, description = "Logout refused"))
)]
pub(crate) async fn reject_logout_handler(
    State(state): State<AppState>,
    Json(body): Json<RejectBody>,
) -> Response {
    let rejection = Rejection::new(body.error, body.error_description);
    respond(state.mediator.reject_logout(&body.challenge, rejection).await)
}

#[utoipa::path(
    post,
    path = "/api/oauth/introspect",
    tag = FLOWS_TAG,
    request_body = IntrospectBody,
    responses(
        (status = 200, description = "Introspection result"),
        (status = 400, description = "Missing token")
    )
)]
pub(crate) async fn introspect_handler(
    State(state): State<AppState>,
    Json(body): Json<IntrospectBody>,
) -> Response {
    respond(
        state
            .mediator
            .introspect(&body.token, body.scope.as_deref())
            .await,
    )
}
