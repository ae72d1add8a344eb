use super::{AuthError, Principal, TokenIntrospector};
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use log::{debug, warn};
use std::sync::Arc;

/// Requires a live bearer token carrying `scope` before the wrapped handler runs
#[derive(Clone)]
pub struct ScopeGate {
    introspector: Arc<dyn TokenIntrospector>,
    scope: &'static str,
}

impl ScopeGate {
    pub fn new(introspector: Arc<dyn TokenIntrospector>, scope: &'static str) -> Self {
        Self {
            introspector,
            scope,
        }
    }

    /// Resolves the caller or says why not. Any failure denies.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;

        let result = self
            .introspector
            .introspect(token, Some(self.scope))
            .await
            .map_err(|e| AuthError::Introspection(e.to_string()))?;

        if !result.active {
            return Err(AuthError::Inactive);
        }
        if result.is_expired_at(Utc::now()) {
            return Err(AuthError::Expired);
        }
        let subject = result.subject.clone().ok_or(AuthError::NoSubject)?;
        if !result.has_scope(self.scope) {
            return Err(AuthError::MissingScope(self.scope.to_string()));
        }

        Ok(Principal {
            subject,
            scopes: result.scopes,
            client_id: result.client_id,
            claims: result.claims,
        })
    }
}

/// Token of an `Authorization: Bearer <token>` header, scheme matched case-insensitively
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

pub async fn scope_gate(
    State(gate): State<ScopeGate>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match gate.authorize(request.headers()).await {
        Ok(principal) => {
            debug!(
                "Scope '{}' granted to subject '{}' (token scopes: {}, claims: {})",
                gate.scope,
                principal.subject,
                principal.scopes.iter().cloned().collect::<Vec<_>>().join(" "),
                principal.claims.len()
            );
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(reason) => {
            warn!(
                "Denied {} {}: {}",
                request.method(),
                request.uri().path(),
                reason
            );
            reason.into_response()
        }
    }
}
