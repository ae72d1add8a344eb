use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

fn access_denied() -> String {
    "access_denied".to_string()
}

/// Query of `GET /api/oauth/login`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct LoginChallengeQuery {
    #[serde(default)]
    pub login_challenge: String,
}

/// Query of `GET /api/oauth/consent`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ConsentChallengeQuery {
    #[serde(default)]
    pub consent_challenge: String,
}

/// Query of `GET /api/oauth/logout`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct LogoutChallengeQuery {
    #[serde(default)]
    pub logout_challenge: String,
}

/// The resource server authenticated the user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AcceptLoginBody {
    #[serde(default)]
    pub login_challenge: String,
    /// Identifier of the authenticated user
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub remember: bool,
    /// Seconds; defaults to the configured value
    #[serde(default)]
    pub remember_for: Option<u64>,
}

/// Claims copied into the issued tokens
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct ConsentSessionBody {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub access_token: Map<String, Value>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub id_token: Map<String, Value>,
}

/// The user granted access
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AcceptConsentBody {
    #[serde(default)]
    pub consent_challenge: String,
    /// Defaults to everything the client requested
    #[serde(default)]
    pub grant_scope: Option<Vec<String>>,
    /// Defaults to the requested audience
    #[serde(default)]
    pub grant_audience: Option<Vec<String>>,
    #[serde(default)]
    pub remember: bool,
    #[serde(default)]
    pub remember_for: Option<u64>,
    #[serde(default)]
    pub session: Option<ConsentSessionBody>,
}

/// Identifies the challenge to act on; accepts the flow-specific field name
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ChallengeBody {
    #[serde(
        default,
        alias = "login_challenge",
        alias = "consent_challenge",
        alias = "logout_challenge"
    )]
    pub challenge: String,
}

/// Refusal of a login, consent or logout
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RejectBody {
    #[serde(
        default,
        alias = "login_challenge",
        alias = "consent_challenge",
        alias = "logout_challenge"
    )]
    pub challenge: String,
    /// OAuth2 error code (default: access_denied)
    #[serde(default = "access_denied")]
    pub error: String,
    #[serde(default)]
    pub error_description: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct IntrospectBody {
    #[serde(default)]
    pub token: String,
    /// Space separated scopes the token must carry
    #[serde(default)]
    pub scope: Option<String>,
}
