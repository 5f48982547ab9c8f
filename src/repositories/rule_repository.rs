use crate::error::{AppError, Result};
use crate::models::FraudRule;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory store for fraud rules. Read-mostly: the risk scorer reads the
/// active set on every evaluation; an external admin workflow mutates it.
#[derive(Debug, Default)]
pub struct RuleRepository {
    rules: RwLock<Vec<FraudRule>>,
}

impl RuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, rule: FraudRule) -> FraudRule {
        self.rules.write().await.push(rule.clone());
        rule
    }

    pub async fn active_rules(&self) -> Vec<FraudRule> {
        self.rules
            .read()
            .await
            .iter()
            .filter(|r| r.active)
            .cloned()
            .collect()
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<()> {
        let mut rules = self.rules.write().await;
        let rule = rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("fraud rule '{}'", id)))?;
        rule.active = active;
        Ok(())
    }
}
