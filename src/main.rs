use rust_decimal::Decimal;
use tracing::info;
use wallet_engine::config::Settings;
use wallet_engine::engine::{Collaborators, WalletEngine};
use wallet_engine::models::UserRole;
use wallet_engine::observability::{init_logging, init_metrics, LogConfig, LogFormat};
use wallet_engine::services::CreateAccountRequest;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;

    // Initialize logging and metrics
    init_logging(&LogConfig {
        level: settings.application.log_level.clone(),
        format: LogFormat::from(settings.application.log_format.as_str()),
        include_target: true,
    });
    init_metrics();
    info!("Configuration loaded");

    // Wire the engine with in-memory collaborators
    let (collaborators, directory) = Collaborators::in_memory();
    let engine = WalletEngine::new(settings, collaborators);
    info!("Wallet engine wired");

    // Startup smoke run: two wallets, a deposit and a transfer
    let alice = directory
        .add_user("alice@example.com", UserRole::User, true)
        .await;
    let bob = directory
        .add_user("bob@example.com", UserRole::User, true)
        .await;

    let alice_account = engine
        .account_service
        .create_account(CreateAccountRequest {
            owner_id: alice.id,
            currency: "USD".to_string(),
            initial_balance: None,
        })
        .await?;
    let bob_account = engine
        .account_service
        .create_account(CreateAccountRequest {
            owner_id: bob.id,
            currency: "USD".to_string(),
            initial_balance: None,
        })
        .await?;

    let deposit = engine
        .transaction_service
        .deposit(alice.id, Decimal::from(500), Some("initial top-up".to_string()))
        .await?;
    info!(transaction = %deposit.transaction_number, "deposit completed");

    let transfer = engine
        .transaction_service
        .transfer(
            alice.id,
            "bob@example.com",
            Decimal::from(120),
            Some("shared dinner".to_string()),
        )
        .await?;
    info!(
        transaction = %transfer.transaction_number,
        fee = %transfer.fee_amount,
        "transfer completed"
    );

    let alice_balance = engine.ledger.balance(alice_account.id).await?;
    let bob_balance = engine.ledger.balance(bob_account.id).await?;
    info!(
        alice = %alice_balance,
        bob = %bob_balance,
        "startup verification complete, engine healthy"
    );

    Ok(())
}
