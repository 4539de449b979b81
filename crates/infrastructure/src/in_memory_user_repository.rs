use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use engeserv_application::{NewUser, UserRecord, UserRepository};
use engeserv_core::{AppError, AppResult};
use engeserv_domain::{EmailAddress, UserId};
use tokio::sync::RwLock;

/// In-memory user repository keyed by user id.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<UserRecord> {
        let mut users = self.users.write().await;

        if users.values().any(|existing| existing.email == user.email) {
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let record = UserRecord {
            id: UserId::new(),
            tenant_id: user.tenant_id,
            branch_id: user.branch_id,
            email: user.email,
            display_name: user.display_name,
            password_hash: user.password_hash,
            role: user.role,
            permissions: user.permissions,
            created_at: Utc::now(),
        };

        users.insert(record.id, record.clone());
        Ok(record)
    }
}
