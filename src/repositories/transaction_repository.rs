use crate::error::{AppError, Result};
use crate::models::{Transaction, TransactionStatus, TransactionType};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<Uuid, Transaction>,
    /// Enforces global uniqueness of transaction numbers.
    number_index: HashMap<String, Uuid>,
}

/// In-memory store for transactions. The number index guarantees that a
/// transaction number, once assigned, is unique across the full history.
#[derive(Debug, Default)]
pub struct TransactionRepository {
    inner: RwLock<Inner>,
}

impl TransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, transaction: Transaction) -> Result<Transaction> {
        let mut inner = self.inner.write().await;
        if inner
            .number_index
            .contains_key(&transaction.transaction_number)
        {
            return Err(AppError::Validation(format!(
                "transaction number '{}' already exists",
                transaction.transaction_number
            )));
        }
        inner
            .number_index
            .insert(transaction.transaction_number.clone(), transaction.id);
        inner.by_id.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    pub async fn exists_by_number(&self, transaction_number: &str) -> bool {
        self.inner
            .read()
            .await
            .number_index
            .contains_key(transaction_number)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    pub async fn find_by_number(&self, transaction_number: &str) -> Result<Option<Transaction>> {
        let inner = self.inner.read().await;
        Ok(inner
            .number_index
            .get(transaction_number)
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    /// Replaces a stored transaction. The transaction number is immutable
    /// once assigned.
    pub async fn update(&self, transaction: &Transaction) -> Result<Transaction> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .by_id
            .get(&transaction.id)
            .ok_or_else(|| AppError::NotFound(format!("transaction '{}'", transaction.id)))?;
        if existing.transaction_number != transaction.transaction_number {
            return Err(AppError::Validation(
                "transaction number is immutable".to_string(),
            ));
        }
        inner.by_id.insert(transaction.id, transaction.clone());
        Ok(transaction.clone())
    }

    /// Non-failed transactions debiting the account since `since`, newest
    /// last. Used by the limit enforcer.
    pub async fn outgoing_since(
        &self,
        account_id: Uuid,
        since: DateTime<Utc>,
    ) -> Vec<Transaction> {
        self.inner
            .read()
            .await
            .by_id
            .values()
            .filter(|t| {
                t.sender_account_id == Some(account_id)
                    && t.created_at >= since
                    && t.status != TransactionStatus::Failed
            })
            .cloned()
            .collect()
    }

    /// Non-failed transactions the account holder initiated since `since`:
    /// everything they sent, plus their own deposits. Used by velocity,
    /// frequency and structuring checks.
    pub async fn initiated_since(
        &self,
        account_id: Uuid,
        since: DateTime<Utc>,
    ) -> Vec<Transaction> {
        self.inner
            .read()
            .await
            .by_id
            .values()
            .filter(|t| {
                t.status != TransactionStatus::Failed
                    && t.created_at >= since
                    && (t.sender_account_id == Some(account_id)
                        || (t.transaction_type == TransactionType::Deposit
                            && t.receiver_account_id == Some(account_id)))
            })
            .cloned()
            .collect()
    }

    pub async fn list_for_account(&self, account_id: Uuid) -> Vec<Transaction> {
        self.inner
            .read()
            .await
            .by_id
            .values()
            .filter(|t| {
                t.sender_account_id == Some(account_id)
                    || t.receiver_account_id == Some(account_id)
            })
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.by_id.len()
    }
}
