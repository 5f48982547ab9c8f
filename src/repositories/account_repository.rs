use crate::error::{AppError, Result};
use crate::models::{Account, AccountStatus};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory store for accounts.
#[derive(Debug, Default)]
pub struct AccountRepository {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl AccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new account. A user holds at most one account per currency.
    pub async fn create(&self, account: Account) -> Result<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.owner_id == account.owner_id && a.currency == account.currency)
        {
            return Err(AppError::Validation(format!(
                "user '{}' already has a {} account",
                account.owner_id, account.currency
            )));
        }
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    /// Finds the first account owned by the given user.
    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.owner_id == owner_id)
            .cloned())
    }

    /// Replaces the account's status, returning the updated account.
    pub async fn update_status(&self, id: Uuid, status: AccountStatus) -> Result<Option<Account>> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.get_mut(&id).map(|account| {
            account.status = status;
            account.updated_at = chrono::Utc::now();
            account.clone()
        }))
    }

    pub async fn count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = AccountRepository::new();
        let owner = Uuid::new_v4();
        let account = repo.create(Account::new(owner, "USD")).await.unwrap();

        let found = repo.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(found.id, account.id);

        let by_owner = repo.find_by_owner(owner).await.unwrap().unwrap();
        assert_eq!(by_owner.id, account.id);
    }

    #[tokio::test]
    async fn test_duplicate_currency_account_rejected() {
        let repo = AccountRepository::new();
        let owner = Uuid::new_v4();
        repo.create(Account::new(owner, "USD")).await.unwrap();
        assert!(repo.create(Account::new(owner, "USD")).await.is_err());
        // A different currency is fine.
        assert!(repo.create(Account::new(owner, "EUR")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_status() {
        let repo = AccountRepository::new();
        let account = repo
            .create(Account::new(Uuid::new_v4(), "USD"))
            .await
            .unwrap();

        let updated = repo
            .update_status(account.id, AccountStatus::Suspended)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, AccountStatus::Suspended);

        let missing = repo
            .update_status(Uuid::new_v4(), AccountStatus::Active)
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
