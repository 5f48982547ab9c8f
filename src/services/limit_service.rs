use crate::config::LimitWindowSettings;
use crate::error::{AppError, Result};
use crate::models::{LimitType, Transaction, UserRole};
use crate::observability::get_metrics;
use crate::repositories::{LimitRepository, TransactionRepository};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// The limit enforcer. Evaluates the most restrictive active
/// TRANSACTION_AMOUNT rule for the sender's role across the single-
/// transaction ceiling and rolling daily/weekly/monthly sums (and a daily
/// count) of the sender's outgoing transactions, including the proposed one.
///
/// With no configured rules for a role the enforcer allows the transaction —
/// fail-open is the recorded product decision, not an oversight.
pub struct LimitService {
    limits: Arc<LimitRepository>,
    transactions: Arc<TransactionRepository>,
    windows: LimitWindowSettings,
}

impl LimitService {
    pub fn new(
        limits: Arc<LimitRepository>,
        transactions: Arc<TransactionRepository>,
        windows: LimitWindowSettings,
    ) -> Self {
        Self {
            limits,
            transactions,
            windows,
        }
    }

    async fn outgoing_amount_and_count(
        &self,
        account_id: Uuid,
        since: DateTime<Utc>,
        exclude: Uuid,
    ) -> (Decimal, usize) {
        let outgoing = self.transactions.outgoing_since(account_id, since).await;
        let mut total = Decimal::ZERO;
        let mut count = 0;
        for tx in outgoing.iter().filter(|t| t.id != exclude) {
            total += tx.amount;
            count += 1;
        }
        (total, count)
    }

    fn deny(role: UserRole, message: String) -> AppError {
        get_metrics().record_limit_denied(&format!("{:?}", role));
        AppError::LimitExceeded(message)
    }

    /// Validates the (already persisted, still pending) transaction against
    /// the role's ceilings. Any breach denies.
    pub async fn enforce(
        &self,
        account_id: Uuid,
        role: UserRole,
        transaction: &Transaction,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let rules = self
            .limits
            .active_for_role(role, LimitType::TransactionAmount)
            .await;
        if rules.is_empty() {
            debug!(?role, "no limit rules configured, transaction unrestricted");
            return Ok(());
        }

        let amount = transaction.amount;

        // Most restrictive value per ceiling across all active rules.
        let single_max = rules.iter().filter_map(|r| r.single_transaction_max).min();
        let daily_max = rules.iter().filter_map(|r| r.daily_max).min();
        let weekly_max = rules.iter().filter_map(|r| r.weekly_max).min();
        let monthly_max = rules.iter().filter_map(|r| r.monthly_max).min();
        let daily_count_max = rules.iter().filter_map(|r| r.daily_count_max).min();

        if let Some(max) = single_max {
            if amount > max {
                return Err(Self::deny(
                    role,
                    format!("amount {} exceeds the single-transaction limit {}", amount, max),
                ));
            }
        }

        let day_start = at - Duration::hours(self.windows.daily_window_hours);
        let (daily_spent, daily_count) = self
            .outgoing_amount_and_count(account_id, day_start, transaction.id)
            .await;

        if let Some(max) = daily_max {
            if daily_spent + amount > max {
                return Err(Self::deny(
                    role,
                    format!(
                        "daily total {} would exceed the limit {}",
                        daily_spent + amount,
                        max
                    ),
                ));
            }
        }

        if let Some(max) = daily_count_max {
            if daily_count + 1 > max as usize {
                return Err(Self::deny(
                    role,
                    format!("daily transaction count would exceed the limit {}", max),
                ));
            }
        }

        if let Some(max) = weekly_max {
            let week_start = at - Duration::days(self.windows.weekly_window_days);
            let (weekly_spent, _) = self
                .outgoing_amount_and_count(account_id, week_start, transaction.id)
                .await;
            if weekly_spent + amount > max {
                return Err(Self::deny(
                    role,
                    format!(
                        "weekly total {} would exceed the limit {}",
                        weekly_spent + amount,
                        max
                    ),
                ));
            }
        }

        if let Some(max) = monthly_max {
            let month_start = at - Duration::days(self.windows.monthly_window_days);
            let (monthly_spent, _) = self
                .outgoing_amount_and_count(account_id, month_start, transaction.id)
                .await;
            if monthly_spent + amount > max {
                return Err(Self::deny(
                    role,
                    format!(
                        "monthly total {} would exceed the limit {}",
                        monthly_spent + amount,
                        max
                    ),
                ));
            }
        }

        Ok(())
    }
}
