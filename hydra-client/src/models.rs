//! Wire types of the Hydra admin interface.
//!
//! Only the fields the gateway reads are typed; everything else the server sends is kept
//! in `extra` so handlers can pass it through to the UI untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// OAuth2 client summary embedded in challenge details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuth2Client {
    #[serde(default)]
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tos_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// OpenID Connect hints forwarded by the relying party
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OidcContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ui_locales: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acr_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token_hint_claims: Option<Map<String, Value>>,
}

/// Details of a pending login challenge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub challenge: String,
    /// True when the authorization server already authenticated this subject
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub client: OAuth2Client,
    #[serde(default)]
    pub request_url: String,
    #[serde(default)]
    pub requested_scope: Vec<String>,
    #[serde(default)]
    pub requested_access_token_audience: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_context: Option<OidcContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Details of a pending consent challenge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsentRequest {
    pub challenge: String,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub client: OAuth2Client,
    #[serde(default)]
    pub request_url: String,
    #[serde(default)]
    pub requested_scope: Vec<String>,
    #[serde(default)]
    pub requested_access_token_audience: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_challenge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_context: Option<OidcContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Details of a pending logout challenge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub challenge: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default)]
    pub request_url: String,
    #[serde(default)]
    pub rp_initiated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<OAuth2Client>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of an accept-login call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptLoginRequest {
    pub subject: String,
    pub remember: bool,
    /// Seconds; 0 means "remember until the browser session ends"
    pub remember_for: i64,
}

/// Extra claims placed into the issued tokens on consent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsentSession {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub access_token: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub id_token: Map<String, Value>,
}

/// Body of an accept-consent call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptConsentRequest {
    pub grant_scope: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grant_access_token_audience: Vec<String>,
    pub remember: bool,
    pub remember_for: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<ConsentSession>,
}

/// Body of every reject call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectRequest {
    pub error: String,
    pub error_description: String,
}

/// Where the browser goes next, decided by the authorization server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTo {
    pub redirect_to: String,
}

/// Raw introspection response (RFC 7662 plus Hydra extensions)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntrospectedToken {
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Space separated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Map<String, Value>>,
}

/// Error body Hydra returns on admin failures
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GenericError {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_request_keeps_unknown_fields() {
        let request: LoginRequest = serde_json::from_value(json!({
            "challenge": "abc",
            "skip": false,
            "subject": "",
            "client": {"client_id": "app", "client_name": "My App"},
            "request_url": "https://auth/oauth2/auth?client_id=app",
            "requested_scope": ["openid", "profile"],
            "requested_access_token_audience": [],
            "oidc_context": {"login_hint": "alice"},
            "ui_theme": "dark"
        }))
        .expect("login request should parse");

        assert_eq!(request.client.client_name.as_deref(), Some("My App"));
        assert_eq!(request.requested_scope, vec!["openid", "profile"]);
        assert_eq!(
            request.oidc_context.and_then(|c| c.login_hint).as_deref(),
            Some("alice")
        );
        assert_eq!(request.extra.get("ui_theme"), Some(&json!("dark")));
    }

    #[test]
    fn test_accept_consent_omits_empty_session() {
        let body = AcceptConsentRequest {
            grant_scope: vec!["openid".to_string()],
            grant_access_token_audience: vec![],
            remember: true,
            remember_for: 3600,
            session: None,
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"grant_scope": ["openid"], "remember": true, "remember_for": 3600})
        );
    }

    #[test]
    fn test_introspected_token_minimal() {
        let token: IntrospectedToken =
            serde_json::from_value(json!({"active": false})).expect("inactive token parses");
        assert!(!token.active);
        assert!(token.sub.is_none());
        assert!(token.scope.is_none());
    }
}
