use crate::models::IntrospectedToken;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Outcome of one live introspection call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntrospectionResult {
    pub active: bool,
    pub subject: Option<String>,
    pub scopes: BTreeSet<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub client_id: Option<String>,
    /// Session claims the consent step attached to the access token
    pub claims: Map<String, Value>,
}

impl IntrospectionResult {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

impl From<IntrospectedToken> for IntrospectionResult {
    fn from(token: IntrospectedToken) -> Self {
        let scopes = token
            .scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Self {
            active: token.active,
            subject: token.sub.filter(|s| !s.is_empty()),
            scopes,
            expires_at: token
                .exp
                .and_then(|exp| Utc.timestamp_opt(exp, 0).single()),
            client_id: token.client_id,
            claims: token.ext.unwrap_or_default(),
        }
    }
}
