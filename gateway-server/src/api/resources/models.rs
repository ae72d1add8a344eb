use crate::store::{ApiToken, UserAccount};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Longest accepted token name, in characters
pub(crate) const MAX_TOKEN_NAME_LEN: usize = 30;

/// Public profile of the token subject
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UserInfo {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub group: String,
}

impl From<UserAccount> for UserInfo {
    fn from(user: UserAccount) -> Self {
        Self {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            email: user.email,
            group: user.group,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct Balance {
    pub quota: i64,
    pub used_quota: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct Usage {
    pub request_count: i64,
    pub used_quota: i64,
    pub quota: i64,
}

/// Token as listed; the key is never part of it
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct TokenSummary {
    pub id: i64,
    pub name: String,
    pub status: i32,
    pub created_time: i64,
    /// -1 when the token never expires
    pub expired_time: i64,
    pub remain_quota: i64,
    pub unlimited_quota: bool,
}

impl From<ApiToken> for TokenSummary {
    fn from(token: ApiToken) -> Self {
        Self {
            id: token.id,
            name: token.name,
            status: token.status,
            created_time: token.created_time,
            expired_time: token.expired_time,
            remain_quota: token.remain_quota,
            unlimited_quota: token.unlimited_quota,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateTokenBody {
    /// At most 30 characters
    pub name: String,
}

/// Returned once, right after creation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreatedToken {
    pub id: i64,
    pub name: String,
    pub key: String,
}
