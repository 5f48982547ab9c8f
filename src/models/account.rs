use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operational state of a wallet account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Account is active and can participate in transactions.
    Active,
    /// Account is suspended (e.g. by a fraud rule) and cannot transact.
    Suspended,
    /// Account is closed and permanently inactive.
    Closed,
}

impl AccountStatus {
    /// Returns true if the account can participate in transactions.
    pub fn is_operational(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }
}

/// A wallet account. The balance lives in `AccountBalance` and is mutated
/// only through the ledger service; the account itself carries identity,
/// ownership and status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    /// Owning user (managed by the out-of-scope user directory).
    pub owner_id: Uuid,
    pub currency: String,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(owner_id: Uuid, currency: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            currency: currency.into(),
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Age of the account in whole days at `now`. Feeds risk scoring.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days()
    }

    pub fn can_transact(&self) -> bool {
        self.status.is_operational()
    }

    /// Suspends the account, preventing new transactions.
    pub fn suspend(&mut self) {
        self.status = AccountStatus::Suspended;
        self.updated_at = Utc::now();
    }

    /// Closes the account permanently.
    pub fn close(&mut self) {
        self.status = AccountStatus::Closed;
        self.updated_at = Utc::now();
    }

    /// Reactivates a suspended account. Closed accounts stay closed.
    pub fn activate(&mut self) {
        if self.status == AccountStatus::Suspended {
            self.status = AccountStatus::Active;
            self.updated_at = Utc::now();
        }
    }
}
