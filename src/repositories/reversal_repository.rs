use crate::error::{AppError, Result};
use crate::models::TransactionReversal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory store for reversal requests.
#[derive(Debug, Default)]
pub struct ReversalRepository {
    reversals: RwLock<HashMap<Uuid, TransactionReversal>>,
}

impl ReversalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, reversal: TransactionReversal) -> TransactionReversal {
        self.reversals
            .write()
            .await
            .insert(reversal.id, reversal.clone());
        reversal
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TransactionReversal>> {
        Ok(self.reversals.read().await.get(&id).cloned())
    }

    pub async fn update(&self, reversal: &TransactionReversal) -> Result<TransactionReversal> {
        let mut reversals = self.reversals.write().await;
        if !reversals.contains_key(&reversal.id) {
            return Err(AppError::NotFound(format!("reversal '{}'", reversal.id)));
        }
        reversals.insert(reversal.id, reversal.clone());
        Ok(reversal.clone())
    }

    pub async fn list_for_transaction(&self, original_id: Uuid) -> Vec<TransactionReversal> {
        self.reversals
            .read()
            .await
            .values()
            .filter(|r| r.original_transaction_id == original_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReversalType;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_create_find_update() {
        let repo = ReversalRepository::new();
        let original = Uuid::new_v4();
        let mut reversal = repo
            .create(TransactionReversal::new(
                original,
                Uuid::new_v4(),
                ReversalType::Full,
                dec!(100),
                "duplicate",
            ))
            .await;

        reversal.approve(Uuid::new_v4(), None).unwrap();
        repo.update(&reversal).await.unwrap();

        let stored = repo.find_by_id(reversal.id).await.unwrap().unwrap();
        assert_eq!(stored.status, crate::models::ReversalStatus::Approved);
        assert_eq!(repo.list_for_transaction(original).await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_reversal() {
        let repo = ReversalRepository::new();
        let reversal = TransactionReversal::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            ReversalType::Refund,
            dec!(5),
            "nope",
        );
        assert!(repo.update(&reversal).await.is_err());
    }
}
