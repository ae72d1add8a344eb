use super::{ApiToken, ResourceStore, StoreError, UserAccount, TOKEN_STATUS_ENABLED};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tokens {
    next_id: i64,
    by_id: BTreeMap<i64, ApiToken>,
}

/// Process-local store for development runs and tests
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<String, UserAccount>>,
    tokens: RwLock<Tokens>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: UserAccount) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    async fn ensure_user(&self, subject: &str) -> Result<(), StoreError> {
        if self.users.read().await.contains_key(subject) {
            Ok(())
        } else {
            Err(StoreError::UserNotFound)
        }
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn user(&self, subject: &str) -> Result<UserAccount, StoreError> {
        self.users
            .read()
            .await
            .get(subject)
            .cloned()
            .ok_or(StoreError::UserNotFound)
    }

    async fn list_tokens(&self, subject: &str, limit: usize) -> Result<Vec<ApiToken>, StoreError> {
        self.ensure_user(subject).await?;
        Ok(self
            .tokens
            .read()
            .await
            .by_id
            .values()
            .filter(|t| t.owner == subject)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn create_token(
        &self,
        subject: &str,
        name: &str,
        key: String,
    ) -> Result<ApiToken, StoreError> {
        self.ensure_user(subject).await?;

        let now = Utc::now().timestamp();
        let mut tokens = self.tokens.write().await;
        tokens.next_id += 1;
        let token = ApiToken {
            id: tokens.next_id,
            owner: subject.to_string(),
            name: name.to_string(),
            key,
            status: TOKEN_STATUS_ENABLED,
            created_time: now,
            accessed_time: now,
            expired_time: -1,
            remain_quota: 0,
            unlimited_quota: false,
        };
        tokens.by_id.insert(token.id, token.clone());
        Ok(token)
    }

    async fn delete_token(&self, subject: &str, id: i64) -> Result<(), StoreError> {
        let mut tokens = self.tokens.write().await;
        match tokens.by_id.get(&id) {
            Some(token) if token.owner == subject => {
                tokens.by_id.remove(&id);
                Ok(())
            }
            _ => Err(StoreError::TokenNotFound),
        }
    }
}
