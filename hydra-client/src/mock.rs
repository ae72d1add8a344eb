use crate::AdminApi;
use crate::error::AdminError;
use crate::models::{
    AcceptConsentRequest, AcceptLoginRequest, ConsentRequest, IntrospectedToken, LoginRequest,
    LogoutRequest, RedirectTo, RejectRequest,
};

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// A call received by [`MockAdmin`], recorded in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCall {
    GetLogin(String),
    AcceptLogin(String, AcceptLoginRequest),
    RejectLogin(String, RejectRequest),
    GetConsent(String),
    AcceptConsent(String, AcceptConsentRequest),
    RejectConsent(String, RejectRequest),
    GetLogout(String),
    AcceptLogout(String),
    RejectLogout(String, RejectRequest),
    Introspect {
        token: String,
        scope: Option<String>,
    },
}

#[derive(Debug)]
struct MockState {
    healthy: bool,
    login: HashMap<String, LoginRequest>,
    consent: HashMap<String, ConsentRequest>,
    logout: HashMap<String, LogoutRequest>,
    tokens: HashMap<String, IntrospectedToken>,
    resolved: HashSet<String>,
    failure: Option<(u16, String, String)>,
    calls: Vec<AdminCall>,
}

/// Scriptable fake of the admin interface.
///
/// Challenges behave like the real server: unknown ones answer 404, and a challenge
/// answers 410 once it has been accepted or rejected. Unknown tokens introspect as
/// inactive.
#[derive(Debug, Clone)]
pub struct MockAdmin {
    state: Arc<Mutex<MockState>>,
    redirect_base: String,
}

impl Default for MockAdmin {
    fn default() -> Self {
        Self::new("http://hydra.test")
    }
}

impl MockAdmin {
    /// `redirect_base` prefixes every `redirect_to` the fake hands out
    pub fn new(redirect_base: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                healthy: true,
                login: HashMap::new(),
                consent: HashMap::new(),
                logout: HashMap::new(),
                tokens: HashMap::new(),
                resolved: HashSet::new(),
                failure: None,
                calls: Vec::new(),
            })),
            redirect_base: redirect_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_login(self, request: LoginRequest) -> Self {
        self.lock().login.insert(request.challenge.clone(), request);
        self
    }

    pub fn with_consent(self, request: ConsentRequest) -> Self {
        self.lock()
            .consent
            .insert(request.challenge.clone(), request);
        self
    }

    pub fn with_logout(self, request: LogoutRequest) -> Self {
        self.lock().logout.insert(request.challenge.clone(), request);
        self
    }

    pub fn with_token(self, token: impl Into<String>, introspected: IntrospectedToken) -> Self {
        self.lock().tokens.insert(token.into(), introspected);
        self
    }

    /// Makes every following call fail with the given admin error
    pub fn fail_with(&self, status: u16, error: &str, description: &str) {
        self.lock().failure = Some((status, error.to_string(), description.to_string()));
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.lock().healthy = healthy;
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<AdminCall> {
        self.lock().calls.clone()
    }

    fn record(&self, call: AdminCall) -> Result<(), AdminError> {
        let mut state = self.lock();
        state.calls.push(call);
        match &state.failure {
            Some((status, error, description)) => Err(AdminError::ResponseError {
                status: *status,
                error: error.clone(),
                description: description.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Marks a known challenge as handled, mirroring the server's single-use rule
    fn resolve(&self, challenge: &str, known: bool) -> Result<(), AdminError> {
        let mut state = self.lock();
        if !known {
            return Err(not_found());
        }
        if !state.resolved.insert(challenge.to_string()) {
            return Err(AdminError::ResponseError {
                status: 410,
                error: "Gone".to_string(),
                description: "The request was already handled".to_string(),
            });
        }
        Ok(())
    }

    fn redirect(&self, path: &str, query: String) -> RedirectTo {
        RedirectTo {
            redirect_to: format!("{}{}?{}", self.redirect_base, path, query),
        }
    }
}

fn not_found() -> AdminError {
    AdminError::ResponseError {
        status: 404,
        error: "Not Found".to_string(),
        description: "Unable to locate the resource".to_string(),
    }
}

#[async_trait]
impl AdminApi for MockAdmin {
    async fn health(&self) -> bool {
        self.lock().healthy
    }

    async fn get_login_request(&self, challenge: &str) -> Result<LoginRequest, AdminError> {
        self.record(AdminCall::GetLogin(challenge.to_string()))?;
        self.lock().login.get(challenge).cloned().ok_or_else(not_found)
    }

    async fn accept_login_request(
        &self,
        challenge: &str,
        body: &AcceptLoginRequest,
    ) -> Result<RedirectTo, AdminError> {
        self.record(AdminCall::AcceptLogin(challenge.to_string(), body.clone()))?;
        let known = self.lock().login.contains_key(challenge);
        self.resolve(challenge, known)?;
        Ok(self.redirect("/oauth2/auth", format!("login_verifier={}", challenge)))
    }

    async fn reject_login_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<RedirectTo, AdminError> {
        self.record(AdminCall::RejectLogin(challenge.to_string(), body.clone()))?;
        let known = self.lock().login.contains_key(challenge);
        self.resolve(challenge, known)?;
        Ok(self.redirect("/oauth2/auth", format!("error={}", body.error)))
    }

    async fn get_consent_request(&self, challenge: &str) -> Result<ConsentRequest, AdminError> {
        self.record(AdminCall::GetConsent(challenge.to_string()))?;
        self.lock()
            .consent
            .get(challenge)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn accept_consent_request(
        &self,
        challenge: &str,
        body: &AcceptConsentRequest,
    ) -> Result<RedirectTo, AdminError> {
        self.record(AdminCall::AcceptConsent(challenge.to_string(), body.clone()))?;
        let known = self.lock().consent.contains_key(challenge);
        self.resolve(challenge, known)?;
        Ok(self.redirect("/oauth2/auth", format!("consent_verifier={}", challenge)))
    }

    async fn reject_consent_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<RedirectTo, AdminError> {
        self.record(AdminCall::RejectConsent(challenge.to_string(), body.clone()))?;
        let known = self.lock().consent.contains_key(challenge);
        self.resolve(challenge, known)?;
        Ok(self.redirect("/oauth2/auth", format!("error={}", body.error)))
    }

    async fn get_logout_request(&self, challenge: &str) -> Result<LogoutRequest, AdminError> {
        self.record(AdminCall::GetLogout(challenge.to_string()))?;
        self.lock()
            .logout
            .get(challenge)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn accept_logout_request(&self, challenge: &str) -> Result<RedirectTo, AdminError> {
        self.record(AdminCall::AcceptLogout(challenge.to_string()))?;
        let known = self.lock().logout.contains_key(challenge);
        self.resolve(challenge, known)?;
        Ok(self.redirect(
            "/oauth2/sessions/logout",
            format!("logout_verifier={}", challenge),
        ))
    }

    async fn reject_logout_request(
        &self,
        challenge: &str,
        body: &RejectRequest,
    ) -> Result<Option<RedirectTo>, AdminError> {
        self.record(AdminCall::RejectLogout(challenge.to_string(), body.clone()))?;
        let known = self.lock().logout.contains_key(challenge);
        self.resolve(challenge, known)?;
        Ok(None)
    }

    async fn introspect_token(
        &self,
        token: &str,
        scope: Option<&str>,
    ) -> Result<IntrospectedToken, AdminError> {
        self.record(AdminCall::Introspect {
            token: token.to_string(),
            scope: scope.map(str::to_string),
        })?;

        let Some(introspected) = self.lock().tokens.get(token).cloned() else {
            return Ok(IntrospectedToken::default());
        };

        // The server reports a token as inactive when it lacks a requested scope
        if let Some(required) = scope.filter(|s| !s.is_empty()) {
            let granted = introspected.scope.as_deref().unwrap_or_default();
            let all_granted = required
                .split_whitespace()
                .all(|r| granted.split_whitespace().any(|g| g == r));
            if !all_granted {
                return Ok(IntrospectedToken::default());
            }
        }
        Ok(introspected)
    }
}
