//! Resource server collaborator.
//!
//! The gateway never owns user accounts or API tokens. Handlers reach them through
//! [`ResourceStore`] with the subject the scope gate verified.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub mod memory;

pub use memory::InMemoryStore;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found")]
    UserNotFound,
    #[error("token not found")]
    TokenNotFound,
    #[error("store backend error: {0}")]
    Backend(String),
}

/// A user account as the resource server knows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserAccount {
    /// Same value as the token subject
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub group: String,
    pub quota: i64,
    pub used_quota: i64,
    pub request_count: i64,
}

/// An API token owned by a user
#[derive(Debug, Clone, PartialEq)]
pub struct ApiToken {
    pub id: i64,
    pub owner: String,
    pub name: String,
    pub key: String,
    pub status: i32,
    /// Unix timestamps in seconds, `expired_time == -1` never expires
    pub created_time: i64,
    pub accessed_time: i64,
    pub expired_time: i64,
    pub remain_quota: i64,
    pub unlimited_quota: bool,
}

pub const TOKEN_STATUS_ENABLED: i32 = 1;

/// Contract the resource server fulfills for the scoped API
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn user(&self, subject: &str) -> Result<UserAccount, StoreError>;

    /// Tokens owned by `subject`, oldest first, at most `limit` of them
    async fn list_tokens(&self, subject: &str, limit: usize) -> Result<Vec<ApiToken>, StoreError>;

    async fn create_token(
        &self,
        subject: &str,
        name: &str,
        key: String,
    ) -> Result<ApiToken, StoreError>;

    /// Deletes a token; a token owned by someone else is reported as not found
    async fn delete_token(&self, subject: &str, id: i64) -> Result<(), StoreError>;
}
