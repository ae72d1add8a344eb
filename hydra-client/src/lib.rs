//! # hydra-client
//!
//! Narrow client for the admin interface of an Ory Hydra compatible authorization server.
//!
//! ## Components
//!
//! - **AdminApi:** the operations the gateway needs: read/accept/reject per challenge
//!   flow, token introspection and a liveness probe.
//! - **HydraAdmin:** the HTTP binding of [`AdminApi`].
//! - **MockAdmin:** a scriptable in-process fake for tests.
//! - **FlowMediator:** high-level API used by the gateway's handlers.

pub mod error;
pub mod introspection;
pub mod mediator;
pub mod mock;
pub mod models;

pub use crate::error::AdminError;
pub use crate::introspection::IntrospectionResult;
pub use crate::mediator::{ConsentDecision, FlowMediator, LoginDecision, Rejection};
pub use crate::mock::{AdminCall, MockAdmin};

use crate::models::{
    AcceptConsentRequest, AcceptLoginRequest, ConsentRequest, GenericError, IntrospectedToken,
    LoginRequest, LogoutRequest, RedirectTo, RejectRequest,
};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// The three challenge handshakes the authorization server delegates to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Login,
    Consent,
    Logout,
}

impl FlowKind {
    fn segment(self) -> &'static str {
        match self {
            FlowKind::Login => "login",
            FlowKind::Consent => "consent",
            FlowKind::Logout => "logout",
        }
    }

    /// Name of the query parameter carrying the challenge
    pub fn challenge_param(self) -> &'static str {
        match self {
            FlowKind::Login => "login_challenge",
            FlowKind::Consent => "consent_challenge",
            FlowKind::Logout => "logout_challenge",
        }
    }
}

/// Trait defining the admin operations consumed by the gateway
#[async_trait]
pub trait AdminApi {
    /// Checks that the admin interface is alive
    async fn health(&self) -> bool;

    async fn get_login_request(&self, challenge: &str) -> Result<LoginRequest, AdminError>;

    async fn accept_login_request(
        &self,
        challenge: &str,
        body: &AcceptLoginRequest,
    ) -> Result<RedirectTo, AdminError>;

    async fn reject_login_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<RedirectTo, AdminError>;

    async fn get_consent_request(&self, challenge: &str) -> Result<ConsentRequest, AdminError>;

    async fn accept_consent_request(
        &self,
        challenge: &str,
        body: &AcceptConsentRequest,
    ) -> Result<RedirectTo, AdminError>;

    async fn reject_consent_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<RedirectTo, AdminError>;

    async fn get_logout_request(&self, challenge: &str) -> Result<LogoutRequest, AdminError>;

    async fn accept_logout_request(&self, challenge: &str) -> Result<RedirectTo, AdminError>;

    /// Hydra answers a logout rejection with `204 No Content`, so a redirect is optional
    async fn reject_logout_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<Option<RedirectTo>, AdminError>;

    /// Introspects a token, optionally asking the server to check a scope as well
    async fn introspect_token(
        &self,
        token: &str,
        scope: Option<&str>,
    ) -> Result<IntrospectedToken, AdminError>;
}

/// HTTP binding of [`AdminApi`] against Hydra's admin endpoints
#[derive(Clone)]
pub struct HydraAdmin {
    pub base_url: Url,
    client: Client,
}

impl std::fmt::Debug for HydraAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HydraAdmin")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HydraAdmin {
    /// Creates a client for the admin interface at `base_url`.
    /// A zero `timeout` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AdminError> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the base ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Some(Duration::from_secs(90)));
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            client: builder.build()?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AdminError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn flow_endpoint(&self, kind: FlowKind, action: Option<&str>) -> Result<Url, AdminError> {
        let path = match action {
            Some(action) => format!("admin/oauth2/auth/requests/{}/{}", kind.segment(), action),
            None => format!("admin/oauth2/auth/requests/{}", kind.segment()),
        };
        self.endpoint(&path)
    }

    async fn get_flow<R>(&self, kind: FlowKind, challenge: &str) -> Result<R, AdminError>
    where
        R: DeserializeOwned,
    {
        let url = self.flow_endpoint(kind, None)?;
        debug!("Fetching {} request from {}", kind.segment(), url);
        let request = self
            .client
            .get(url)
            .query(&[(kind.challenge_param(), challenge)]);
        self.send(request).await
    }

    fn put_flow(
        &self,
        kind: FlowKind,
        action: &str,
        challenge: &str,
    ) -> Result<RequestBuilder, AdminError> {
        let url = self.flow_endpoint(kind, Some(action))?;
        debug!("Sending {} {} to {}", kind.segment(), action, url);
        Ok(self
            .client
            .put(url)
            .query(&[(kind.challenge_param(), challenge)]))
    }

    /// Sends a request and parses a JSON body out of a success response
    async fn send<R>(&self, request: RequestBuilder) -> Result<R, AdminError>
    where
        R: DeserializeOwned,
    {
        let response = self.send_raw(request).await?;
        response.json::<R>().await.map_err(|e| {
            AdminError::DeserializationError(format!("Failed to deserialize response: {}", e))
        })
    }

    /// Sends a request and fails on any non-success status
    async fn send_raw(&self, request: RequestBuilder) -> Result<Response, AdminError> {
        let response = request
            .send()
            .await
            .map_err(|e| AdminError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(response_error(response).await);
        }
        Ok(response)
    }
}

/// Builds an [`AdminError::ResponseError`] from Hydra's error body, keeping its wording
async fn response_error(response: Response) -> AdminError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<GenericError>(&text).unwrap_or_default();

    let error = if parsed.error.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request_failed")
            .to_string()
    } else {
        parsed.error
    };
    let description = parsed
        .error_description
        .or(parsed.message)
        .unwrap_or(text);

    AdminError::ResponseError {
        status: status.as_u16(),
        error,
        description,
    }
}

#[async_trait]
impl AdminApi for HydraAdmin {
    /// Checks liveness by sending a GET request to `/health/alive`
    async fn health(&self) -> bool {
        let Ok(url) = self.endpoint("health/alive") else {
            return false;
        };
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Admin health check failed: {}", e);
                false
            }
        }
    }

    async fn get_login_request(&self, challenge: &str) -> Result<LoginRequest, AdminError> {
        self.get_flow(FlowKind::Login, challenge).await
    }

    async fn accept_login_request(
        &self,
        challenge: &str,
        body: &AcceptLoginRequest,
    ) -> Result<RedirectTo, AdminError> {
        let request = self.put_flow(FlowKind::Login, "accept", challenge)?.json(body);
        self.send(request).await
    }

    async fn reject_login_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<RedirectTo, AdminError> {
        let request = self.put_flow(FlowKind::Login, "reject", challenge)?.json(body);
        self.send(request).await
    }

    async fn get_consent_request(&self, challenge: &str) -> Result<ConsentRequest, AdminError> {
        self.get_flow(FlowKind::Consent, challenge).await
    }

    async fn accept_consent_request(
        &self,
        challenge: &str,
        body: &AcceptConsentRequest,
    ) -> Result<RedirectTo, AdminError> {
        let request = self
            .put_flow(FlowKind::Consent, "accept", challenge)?
            .json(body);
        self.send(request).await
    }

    async fn reject_consent_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<RedirectTo, AdminError> {
        let request = self
            .put_flow(FlowKind::Consent, "reject", challenge)?
            .json(body);
        self.send(request).await
    }

    async fn get_logout_request(&self, challenge: &str) -> Result<LogoutRequest, AdminError> {
        self.get_flow(FlowKind::Logout, challenge).await
    }

    async fn accept_logout_request(&self, challenge: &str) -> Result<RedirectTo, AdminError> {
        let request = self.put_flow(FlowKind::Logout, "accept", challenge)?;
        self.send(request).await
    }

    async fn reject_logout_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<Option<RedirectTo>, AdminError> {
        let request = self
            .put_flow(FlowKind::Logout, "reject", challenge)?
            .json(body);
        let response = self.send_raw(request).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice::<RedirectTo>(&bytes)
            .map(Some)
            .map_err(|e| {
                AdminError::DeserializationError(format!("Failed to deserialize response: {}", e))
            })
    }

    async fn introspect_token(
        &self,
        token: &str,
        scope: Option<&str>,
    ) -> Result<IntrospectedToken, AdminError> {
        let url = self.endpoint("admin/oauth2/introspect")?;
        let mut form = vec![("token", token)];
        if let Some(scope) = scope.filter(|s| !s.is_empty()) {
            form.push(("scope", scope));
        }
        debug!("Introspecting token at {}", url);
        self.send(self.client.post(url).form(&form)).await
    }
}

/// An enum that can hold the different [`AdminApi`] implementations
#[derive(Clone, Debug)]
pub enum AdminType {
    /// The real admin interface over HTTP
    Hydra(HydraAdmin),
    /// A scripted in-process fake
    Mock(MockAdmin),
}

#[async_trait]
impl AdminApi for AdminType {
    async fn health(&self) -> bool {
        match self {
            AdminType::Hydra(a) => a.health().await,
            AdminType::Mock(a) => a.health().await,
        }
    }

    async fn get_login_request(&self, challenge: &str) -> Result<LoginRequest, AdminError> {
        match self {
            AdminType::Hydra(a) => a.get_login_request(challenge).await,
            AdminType::Mock(a) => a.get_login_request(challenge).await,
        }
    }

    async fn accept_login_request(
        &self,
        challenge: &str,
        body: &AcceptLoginRequest,
    ) -> Result<RedirectTo, AdminError> {
        match self {
            AdminType::Hydra(a) => a.accept_login_request(challenge, body).await,
            AdminType::Mock(a) => a.accept_login_request(challenge, body).await,
        }
    }

    async fn reject_login_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<RedirectTo, AdminError> {
        match self {
            AdminType::Hydra(a) => a.reject_login_request(challenge, body).await,
            AdminType::Mock(a) => a.reject_login_request(challenge, body).await,
        }
    }

    async fn get_consent_request(&self, challenge: &str) -> Result<ConsentRequest, AdminError> {
        match self {
            AdminType::Hydra(a) => a.get_consent_request(challenge).await,
            AdminType::Mock(a) => a.get_consent_request(challenge).await,
        }
    }

    async fn accept_consent_request(
        &self,
        challenge: &str,
        body: &AcceptConsentRequest,
    ) -> Result<RedirectTo, AdminError> {
        match self {
            AdminType::Hydra(a) => a.accept_consent_request(challenge, body).await,
            AdminType::Mock(a) => a.accept_consent_request(challenge, body).await,
        }
    }

    async fn reject_consent_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<RedirectTo, AdminError> {
        match self {
            AdminType::Hydra(a) => a.reject_consent_request(challenge, body).await,
            AdminType::Mock(a) => a.reject_consent_request(challenge, body).await,
        }
    }

    async fn get_logout_request(&self, challenge: &str) -> Result<LogoutRequest, AdminError> {
        match self {
            AdminType::Hydra(a) => a.get_logout_request(challenge).await,
            AdminType::Mock(a) => a.get_logout_request(challenge).await,
        }
    }

    async fn accept_logout_request(&self, challenge: &str) -> Result<RedirectTo, AdminError> {
        match self {
            AdminType::Hydra(a) => a.accept_logout_request(challenge).await,
            AdminType::Mock(a) => a.accept_logout_request(challenge).await,
        }
    }

    async fn reject_logout_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<Option<RedirectTo>, AdminError> {
        match self {
            AdminType::Hydra(a) => a.reject_logout_request(challenge, body).await,
            AdminType::Mock(a) => a.reject_logout_request(challenge, body).await,
        }
    }

    async fn introspect_token(
        &self,
        token: &str,
        scope: Option<&str>,
    ) -> Result<IntrospectedToken, AdminError> {
        match self {
            AdminType::Hydra(a) => a.introspect_token(token, scope).await,
            AdminType::Mock(a) => a.introspect_token(token, scope).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let admin = HydraAdmin::new("http://hydra:4445/prefix", Duration::ZERO).unwrap();
        assert_eq!(admin.base_url.as_str(), "http://hydra:4445/prefix/");
        assert_eq!(
            admin
                .flow_endpoint(FlowKind::Consent, Some("accept"))
                .unwrap()
                .as_str(),
            "http://hydra:4445/prefix/admin/oauth2/auth/requests/consent/accept"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HydraAdmin::new("not a url", Duration::ZERO);
        assert!(matches!(result, Err(AdminError::UrlParse(_))));
    }

    #[test]
    fn test_challenge_params() {
        assert_eq!(FlowKind::Login.challenge_param(), "login_challenge");
        assert_eq!(FlowKind::Consent.challenge_param(), "consent_challenge");
        assert_eq!(FlowKind::Logout.challenge_param(), "logout_challenge");
    }
}
