//! Trait boundaries for the out-of-scope collaborators the engine consumes:
//! user lookup and KYC status. Production wiring plugs platform services in
//! here; tests and the demo binary use [`InMemoryDirectory`].

use crate::error::Result;
use crate::models::UserRole;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Minimal view of a user the engine needs: identity, email (transfer
/// addressing) and role (limit rules).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

/// User lookup, owned by the platform's user-management service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRef>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRef>>;
}

/// KYC verification status, owned by the platform's KYC workflow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KycProvider: Send + Sync {
    async fn is_verified(&self, user_id: Uuid) -> bool;
}

/// In-memory directory implementing both collaborator traits.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<Uuid, UserRef>>,
    verified: RwLock<HashSet<Uuid>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(
        &self,
        email: impl Into<String>,
        role: UserRole,
        kyc_verified: bool,
    ) -> UserRef {
        let user = UserRef {
            id: Uuid::new_v4(),
            email: email.into(),
            role,
        };
        self.users.write().await.insert(user.id, user.clone());
        if kyc_verified {
            self.verified.write().await.insert(user.id);
        }
        user
    }

    pub async fn set_verified(&self, user_id: Uuid, verified: bool) {
        let mut set = self.verified.write().await;
        if verified {
            set.insert(user_id);
        } else {
            set.remove(&user_id);
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRef>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRef>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl KycProvider for InMemoryDirectory {
    async fn is_verified(&self, user_id: Uuid) -> bool {
        self.verified.read().await.contains(&user_id)
    }
}
