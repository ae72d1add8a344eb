//! High-level challenge handshake API.
//!
//! The mediator keeps no state between calls. Challenges are single-use on the
//! authorization server; a second accept/reject is forwarded as-is and whatever error
//! the server answers with is returned unchanged. Nothing here retries.

use crate::error::AdminError;
use crate::introspection::IntrospectionResult;
use crate::models::{
    AcceptConsentRequest, AcceptLoginRequest, ConsentRequest, ConsentSession, LoginRequest,
    LogoutRequest, RedirectTo, RejectRequest,
};
use crate::{AdminApi, AdminType, FlowKind};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of the resource server's own authentication step
#[derive(Debug, Clone, PartialEq)]
pub struct LoginDecision {
    pub subject: String,
    pub remember: bool,
    pub remember_for: Duration,
}

/// What the user agreed to share
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConsentDecision {
    pub grant_scope: Vec<String>,
    pub grant_audience: Vec<String>,
    pub remember: bool,
    pub remember_for: Duration,
    pub session: Option<ConsentSession>,
}

/// Reason for refusing any of the three flows
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub error: String,
    pub description: String,
}

impl Rejection {
    pub fn new(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            description: description.into(),
        }
    }

    /// The user refused
    pub fn access_denied(description: impl Into<String>) -> Self {
        Self::new("access_denied", description)
    }

    fn to_body(&self) -> RejectRequest {
        RejectRequest {
            error: self.error.clone(),
            error_description: self.description.clone(),
        }
    }
}

fn seconds(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

fn require_challenge(kind: FlowKind, challenge: &str) -> Result<(), AdminError> {
    if challenge.trim().is_empty() {
        return Err(AdminError::MissingParameter(kind.challenge_param()));
    }
    Ok(())
}

/// Resolves login, consent and logout challenges against the admin interface
pub struct FlowMediator<A = AdminType> {
    admin: Arc<A>,
}

impl<A> Clone for FlowMediator<A> {
    fn clone(&self) -> Self {
        Self {
            admin: Arc::clone(&self.admin),
        }
    }
}

impl<A> FlowMediator<A>
where
    A: AdminApi + Send + Sync,
{
    pub fn new(admin: A) -> Self {
        Self {
            admin: Arc::new(admin),
        }
    }

    pub fn admin(&self) -> &A {
        &self.admin
    }

    pub async fn health(&self) -> bool {
        self.admin.health().await
    }

    pub async fn login_request(&self, challenge: &str) -> Result<LoginRequest, AdminError> {
        require_challenge(FlowKind::Login, challenge)?;
        debug!("Reading login challenge");
        self.admin.get_login_request(challenge).await
    }

    pub async fn accept_login(
        &self,
        challenge: &str,
        decision: LoginDecision,
    ) -> Result<RedirectTo, AdminError> {
        require_challenge(FlowKind::Login, challenge)?;
        if decision.subject.trim().is_empty() {
            return Err(AdminError::MissingParameter("subject"));
        }

        let body = AcceptLoginRequest {
            subject: decision.subject,
            remember: decision.remember,
            remember_for: seconds(decision.remember_for),
        };
        info!(
            "Accepting login for subject '{}' (remember: {})",
            body.subject, body.remember
        );
        self.admin.accept_login_request(challenge, &body).await
    }

    pub async fn reject_login(
        &self,
        challenge: &str,
        rejection: Rejection,
    ) -> Result<RedirectTo, AdminError> {
        require_challenge(FlowKind::Login, challenge)?;
        info!("Rejecting login: {}", rejection.error);
        self.admin
            .reject_login_request(challenge, &rejection.to_body())
            .await
    }

    pub async fn consent_request(&self, challenge: &str) -> Result<ConsentRequest, AdminError> {
        require_challenge(FlowKind::Consent, challenge)?;
        debug!("Reading consent challenge");
        self.admin.get_consent_request(challenge).await
    }

    pub async fn accept_consent(
        &self,
        challenge: &str,
        decision: ConsentDecision,
    ) -> Result<RedirectTo, AdminError> {
        require_challenge(FlowKind::Consent, challenge)?;

        let body = AcceptConsentRequest {
            grant_scope: decision.grant_scope,
            grant_access_token_audience: decision.grant_audience,
            remember: decision.remember,
            remember_for: seconds(decision.remember_for),
            session: decision.session,
        };
        info!("Accepting consent for scopes [{}]", body.grant_scope.join(" "));
        self.admin.accept_consent_request(challenge, &body).await
    }

    pub async fn reject_consent(
        &self,
        challenge: &str,
        rejection: Rejection,
    ) -> Result<RedirectTo, AdminError> {
        require_challenge(FlowKind::Consent, challenge)?;
        info!("Rejecting consent: {}", rejection.error);
        self.admin
            .reject_consent_request(challenge, &rejection.to_body())
            .await
    }

    pub async fn logout_request(&self, challenge: &str) -> Result<LogoutRequest, AdminError> {
        require_challenge(FlowKind::Logout, challenge)?;
        debug!("Reading logout challenge");
        self.admin.get_logout_request(challenge).await
    }

    /// Logout acceptance is unconditional
    pub async fn accept_logout(&self, challenge: &str) -> Result<RedirectTo, AdminError> {
        require_challenge(FlowKind::Logout, challenge)?;
        info!("Accepting logout");
        self.admin.accept_logout_request(challenge).await
    }

    pub async fn reject_logout(
        &self,
        challenge: &str,
        rejection: Rejection,
    ) -> Result<Option<RedirectTo>, AdminError> {
        require_challenge(FlowKind::Logout, challenge)?;
        info!("Rejecting logout: {}", rejection.error);
        self.admin
            .reject_logout_request(challenge, &rejection.to_body())
            .await
    }

    /// Live introspection, never cached
    pub async fn introspect(
        &self,
        token: &str,
        scope: Option<&str>,
    ) -> Result<IntrospectionResult, AdminError> {
        if token.is_empty() {
            return Err(AdminError::MissingParameter("token"));
        }
        let introspected = self.admin.introspect_token(token, scope).await?;
        Ok(IntrospectionResult::from(introspected))
    }
}
