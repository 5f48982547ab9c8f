use crate::error::{AppError, Result};
use crate::models::{Account, AccountBalance};
use crate::observability::{get_metrics, LatencyTimer};
use crate::repositories::{AccountRepository, BalanceRepository};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tokio::time::timeout;
use tracing::debug;
use uuid::Uuid;

use crate::config::LedgerSettings;

/// The account ledger: sole owner of balance mutation. Every mutation runs
/// inside the account's balance lock, so concurrent operations on one account
/// serialize and the authoritative status/sufficiency checks happen in the
/// same critical section as the mutation itself.
///
/// Cross-account transfers take both locks in ascending account-id order;
/// lock waits are bounded by `lock_timeout` and fail with
/// `ConcurrencyConflict` instead of blocking indefinitely.
pub struct LedgerService {
    accounts: Arc<AccountRepository>,
    balances: Arc<BalanceRepository>,
    lock_timeout: Duration,
}

impl LedgerService {
    pub fn new(
        accounts: Arc<AccountRepository>,
        balances: Arc<BalanceRepository>,
        settings: &LedgerSettings,
    ) -> Self {
        Self {
            accounts,
            balances,
            lock_timeout: Duration::from_millis(settings.lock_timeout_ms),
        }
    }

    async fn lock_balance(&self, account_id: Uuid) -> Result<OwnedMutexGuard<AccountBalance>> {
        let cell = self.balances.cell(account_id).await?;
        match timeout(self.lock_timeout, cell.lock_owned()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                get_metrics().record_lock_conflict();
                Err(AppError::ConcurrencyConflict(account_id))
            }
        }
    }

    /// Reads the account and fails unless it is ACTIVE. Called while the
    /// balance lock is held so a suspension cannot race the mutation.
    async fn ensure_active(&self, account_id: Uuid) -> Result<Account> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account '{}'", account_id)))?;
        if !account.can_transact() {
            return Err(AppError::AccountNotActive(account_id));
        }
        Ok(account)
    }

    fn ensure_positive(amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        Ok(())
    }

    /// Atomically increases an account's balance. Returns the new balance.
    pub async fn credit(&self, account_id: Uuid, amount: Decimal) -> Result<Decimal> {
        Self::ensure_positive(amount)?;
        let timer = LatencyTimer::new();

        let mut guard = self.lock_balance(account_id).await?;
        self.ensure_active(account_id).await?;
        guard.credit(amount);
        let new_balance = guard.balance;
        drop(guard);

        get_metrics().record_ledger_latency(timer.elapsed_ms());
        debug!(%account_id, new_balance = %new_balance, "ledger credit applied");
        Ok(new_balance)
    }

    /// Atomically decreases an account's balance, failing closed if the
    /// account is inactive or funds are insufficient. Returns the new balance.
    pub async fn debit(&self, account_id: Uuid, amount: Decimal) -> Result<Decimal> {
        Self::ensure_positive(amount)?;
        let timer = LatencyTimer::new();

        let mut guard = self.lock_balance(account_id).await?;
        self.ensure_active(account_id).await?;
        guard.debit(amount)?;
        let new_balance = guard.balance;
        drop(guard);

        get_metrics().record_ledger_latency(timer.elapsed_ms());
        debug!(%account_id, new_balance = %new_balance, "ledger debit applied");
        Ok(new_balance)
    }

    /// Atomically debits one account and credits another as a pair: both
    /// mutations happen under both locks, or neither happens. The debited and
    /// credited amounts may differ (the difference is a retained fee).
    pub async fn transfer(
        &self,
        debit_account_id: Uuid,
        credit_account_id: Uuid,
        debit_amount: Decimal,
        credit_amount: Decimal,
    ) -> Result<(Decimal, Decimal)> {
        Self::ensure_positive(debit_amount)?;
        Self::ensure_positive(credit_amount)?;
        if debit_account_id == credit_account_id {
            return Err(AppError::Validation(
                "debit and credit accounts must differ".to_string(),
            ));
        }
        let timer = LatencyTimer::new();

        // Fixed global lock order keeps two opposite transfers between the
        // same pair of accounts from deadlocking.
        let (first, second) = if debit_account_id < credit_account_id {
            (debit_account_id, credit_account_id)
        } else {
            (credit_account_id, debit_account_id)
        };

        let first_guard = self.lock_balance(first).await?;
        let second_guard = self.lock_balance(second).await?;

        let (mut debit_guard, mut credit_guard) = if first == debit_account_id {
            (first_guard, second_guard)
        } else {
            (second_guard, first_guard)
        };

        self.ensure_active(debit_account_id).await?;
        self.ensure_active(credit_account_id).await?;

        debit_guard.debit(debit_amount)?;
        credit_guard.credit(credit_amount);

        let balances = (debit_guard.balance, credit_guard.balance);
        drop(debit_guard);
        drop(credit_guard);

        get_metrics().record_ledger_latency(timer.elapsed_ms());
        debug!(
            from = %debit_account_id,
            to = %credit_account_id,
            "ledger transfer applied"
        );
        Ok(balances)
    }

    /// Point-in-time balance of an account.
    pub async fn balance(&self, account_id: Uuid) -> Result<Decimal> {
        Ok(self.balances.snapshot(account_id).await?.balance)
    }
}
