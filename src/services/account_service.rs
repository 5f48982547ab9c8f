use crate::error::{AppError, Result};
use crate::models::{Account, AccountBalance, AccountStatus};
use crate::repositories::{AccountRepository, BalanceRepository};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Request to open a wallet account.
#[derive(Debug, Clone)]
pub struct CreateAccountRequest {
    pub owner_id: Uuid,
    pub currency: String,
    pub initial_balance: Option<Decimal>,
}

/// Account management: opening accounts and moving them between statuses.
/// Balance mutation stays with the ledger; this service only seeds the
/// initial balance record.
pub struct AccountService {
    accounts: Arc<AccountRepository>,
    balances: Arc<BalanceRepository>,
}

impl AccountService {
    pub fn new(accounts: Arc<AccountRepository>, balances: Arc<BalanceRepository>) -> Self {
        Self { accounts, balances }
    }

    pub async fn create_account(&self, request: CreateAccountRequest) -> Result<Account> {
        if request.currency.len() != 3 {
            return Err(AppError::Validation(
                "currency must be a 3-letter ISO 4217 code".to_string(),
            ));
        }
        let initial_balance = request.initial_balance.unwrap_or(Decimal::ZERO);
        if initial_balance < Decimal::ZERO {
            return Err(AppError::Validation(
                "initial balance cannot be negative".to_string(),
            ));
        }

        let account = self
            .accounts
            .create(Account::new(request.owner_id, request.currency.clone()))
            .await?;
        self.balances
            .create(AccountBalance::with_balance(
                account.id,
                request.currency,
                initial_balance,
            ))
            .await?;

        info!(account_id = %account.id, owner_id = %account.owner_id, "account opened");
        Ok(account)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Account> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account '{}'", id)))
    }

    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Account> {
        self.accounts
            .find_by_owner(owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account for user '{}'", owner_id)))
    }

    /// Suspends an account, preventing new transactions.
    pub async fn suspend_account(&self, id: Uuid) -> Result<Account> {
        let account = self.find_by_id(id).await?;
        if account.status == AccountStatus::Closed {
            return Err(AppError::Validation(
                "cannot suspend a closed account".to_string(),
            ));
        }
        self.accounts
            .update_status(id, AccountStatus::Suspended)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account '{}'", id)))
    }

    /// Reactivates a suspended account.
    pub async fn activate_account(&self, id: Uuid) -> Result<Account> {
        let account = self.find_by_id(id).await?;
        if account.status == AccountStatus::Closed {
            return Err(AppError::Validation(
                "cannot activate a closed account".to_string(),
            ));
        }
        self.accounts
            .update_status(id, AccountStatus::Active)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account '{}'", id)))
    }

    /// Closes an account permanently. Only zero-balance accounts close.
    pub async fn close_account(&self, id: Uuid) -> Result<Account> {
        let account = self.find_by_id(id).await?;
        if account.status == AccountStatus::Closed {
            return Err(AppError::Validation("account is already closed".to_string()));
        }

        let balance = self.balances.snapshot(id).await?;
        if balance.balance != Decimal::ZERO {
            return Err(AppError::Validation(
                "cannot close an account with a non-zero balance".to_string(),
            ));
        }

        self.accounts
            .update_status(id, AccountStatus::Closed)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account '{}'", id)))
    }

    pub async fn get_balance(&self, id: Uuid) -> Result<AccountBalance> {
        self.find_by_id(id).await?;
        self.balances.snapshot(id).await
    }
}
