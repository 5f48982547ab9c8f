use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of the user a limit rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Merchant,
    Admin,
}

/// What the ceilings of a rule constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitType {
    /// Ceilings on transaction amounts and counts.
    TransactionAmount,
    /// Ceiling on the number of accounts a user may hold (enforced by the
    /// out-of-scope account-admin workflow).
    AccountCount,
}

/// Per-role ceilings. `None` means that ceiling is unrestricted. Rules are
/// read-only from the engine's perspective; an external admin workflow
/// maintains them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLimit {
    pub id: Uuid,
    pub role: UserRole,
    pub limit_type: LimitType,
    pub active: bool,
    pub single_transaction_max: Option<Decimal>,
    pub daily_max: Option<Decimal>,
    pub weekly_max: Option<Decimal>,
    pub monthly_max: Option<Decimal>,
    pub daily_count_max: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl AccountLimit {
    /// Creates an unrestricted TRANSACTION_AMOUNT rule for a role; callers
    /// tighten individual ceilings with the `with_*` builders.
    pub fn transaction_amount(role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            limit_type: LimitType::TransactionAmount,
            active: true,
            single_transaction_max: None,
            daily_max: None,
            weekly_max: None,
            monthly_max: None,
            daily_count_max: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_single_max(mut self, max: Decimal) -> Self {
        self.single_transaction_max = Some(max);
        self
    }

    pub fn with_daily_max(mut self, max: Decimal) -> Self {
        self.daily_max = Some(max);
        self
    }

    pub fn with_weekly_max(mut self, max: Decimal) -> Self {
        self.weekly_max = Some(max);
        self
    }

    pub fn with_monthly_max(mut self, max: Decimal) -> Self {
        self.monthly_max = Some(max);
        self
    }

    pub fn with_daily_count_max(mut self, max: u32) -> Self {
        self.daily_count_max = Some(max);
        self
    }
}
