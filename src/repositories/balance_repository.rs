use crate::error::{AppError, Result};
use crate::models::AccountBalance;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// In-memory store for balances. Each balance lives behind its own async
/// mutex; that mutex is the serialization point for all ledger mutations on
/// the account, so concurrent debit/credit pairs can never interleave.
#[derive(Debug, Default)]
pub struct BalanceRepository {
    balances: RwLock<HashMap<Uuid, Arc<Mutex<AccountBalance>>>>,
}

impl BalanceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, balance: AccountBalance) -> Result<()> {
        let mut balances = self.balances.write().await;
        if balances.contains_key(&balance.account_id) {
            return Err(AppError::Validation(format!(
                "balance for account '{}' already exists",
                balance.account_id
            )));
        }
        balances.insert(balance.account_id, Arc::new(Mutex::new(balance)));
        Ok(())
    }

    /// Returns the lock cell for an account's balance. Callers serialize
    /// mutations by holding the cell's mutex.
    pub async fn cell(&self, account_id: Uuid) -> Result<Arc<Mutex<AccountBalance>>> {
        self.balances
            .read()
            .await
            .get(&account_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("balance for account '{}'", account_id)))
    }

    /// Point-in-time copy of an account's balance.
    pub async fn snapshot(&self, account_id: Uuid) -> Result<AccountBalance> {
        let cell = self.cell(account_id).await?;
        let guard = cell.lock().await;
        Ok(guard.clone())
    }

    /// Sum of all balances, used for conservation checks.
    pub async fn total_balance(&self) -> Decimal {
        let cells: Vec<_> = self.balances.read().await.values().cloned().collect();
        let mut total = Decimal::ZERO;
        for cell in cells {
            total += cell.lock().await.balance;
        }
        total
    }
}
