use crate::models::{AccountLimit, LimitType, UserRole};
use tokio::sync::RwLock;

/// In-memory store for account-limit rules. Read-only from the engine's
/// perspective; populated by an external admin workflow.
#[derive(Debug, Default)]
pub struct LimitRepository {
    limits: RwLock<Vec<AccountLimit>>,
}

impl LimitRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, limit: AccountLimit) -> AccountLimit {
        self.limits.write().await.push(limit.clone());
        limit
    }

    pub async fn active_for_role(&self, role: UserRole, limit_type: LimitType) -> Vec<AccountLimit> {
        self.limits
            .read()
            .await
            .iter()
            .filter(|l| l.active && l.role == role && l.limit_type == limit_type)
            .cloned()
            .collect()
    }
}
