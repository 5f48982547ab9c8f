use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Balance of an account. The `version` field increments on every mutation so
/// readers can observe whether a snapshot is stale; mutation itself is
/// serialized by the per-account lock the balance repository owns.
///
/// Invariant: `balance` never goes negative — `debit` fails closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_id: Uuid,
    pub currency: String,
    pub balance: Decimal,
    pub version: i64,
    pub last_updated: DateTime<Utc>,
}

impl AccountBalance {
    /// Creates a zero balance.
    pub fn new(account_id: Uuid, currency: impl Into<String>) -> Self {
        Self::with_balance(account_id, currency, Decimal::ZERO)
    }

    pub fn with_balance(
        account_id: Uuid,
        currency: impl Into<String>,
        balance: Decimal,
    ) -> Self {
        Self {
            account_id,
            currency: currency.into(),
            balance,
            version: 1,
            last_updated: Utc::now(),
        }
    }

    pub fn has_sufficient_funds(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }

    /// Increases the balance.
    pub fn credit(&mut self, amount: Decimal) {
        self.balance += amount;
        self.version += 1;
        self.last_updated = Utc::now();
    }

    /// Decreases the balance, failing closed on insufficient funds.
    pub fn debit(&mut self, amount: Decimal) -> Result<()> {
        if !self.has_sufficient_funds(amount) {
            return Err(AppError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        self.version += 1;
        self.last_updated = Utc::now();
        Ok(())
    }
}
