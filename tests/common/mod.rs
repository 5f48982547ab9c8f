use rust_decimal::Decimal;
use std::sync::Arc;
use wallet_engine::collaborators::{InMemoryDirectory, UserRef};
use wallet_engine::config::Settings;
use wallet_engine::engine::{Collaborators, WalletEngine};
use wallet_engine::models::{Account, UserRole};
use wallet_engine::services::CreateAccountRequest;

pub struct TestContext {
    pub engine: WalletEngine,
    pub directory: Arc<InMemoryDirectory>,
}

pub async fn setup_engine() -> TestContext {
    setup_engine_with(Settings::default()).await
}

pub async fn setup_engine_with(settings: Settings) -> TestContext {
    let (collaborators, directory) = Collaborators::in_memory();
    TestContext {
        engine: WalletEngine::new(settings, collaborators),
        directory,
    }
}

impl TestContext {
    /// Seeds a user with a funded USD wallet.
    pub async fn user_with_account(
        &self,
        email: &str,
        role: UserRole,
        kyc_verified: bool,
        balance: Decimal,
    ) -> (UserRef, Account) {
        let user = self.directory.add_user(email, role, kyc_verified).await;
        let account = self
            .engine
            .account_service
            .create_account(CreateAccountRequest {
                owner_id: user.id,
                currency: "USD".to_string(),
                initial_balance: Some(balance),
            })
            .await
            .expect("failed to create account");
        (user, account)
    }
}
