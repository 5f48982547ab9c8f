use criterion::{criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;
use tokio::runtime::Runtime;
use wallet_engine::collaborators::UserRef;
use wallet_engine::config::Settings;
use wallet_engine::engine::{Collaborators, WalletEngine};
use wallet_engine::models::UserRole;
use wallet_engine::services::CreateAccountRequest;

struct BenchSetup {
    engine: WalletEngine,
    alice: UserRef,
}

async fn setup() -> BenchSetup {
    let (collaborators, directory) = Collaborators::in_memory();
    let engine = WalletEngine::new(Settings::default(), collaborators);

    let alice = directory
        .add_user("alice@example.com", UserRole::User, true)
        .await;
    let bob = directory
        .add_user("bob@example.com", UserRole::User, true)
        .await;

    engine
        .account_service
        .create_account(CreateAccountRequest {
            owner_id: alice.id,
            currency: "USD".to_string(),
            initial_balance: Some(Decimal::from(1_000_000_000)),
        })
        .await
        .expect("alice account");
    engine
        .account_service
        .create_account(CreateAccountRequest {
            owner_id: bob.id,
            currency: "USD".to_string(),
            initial_balance: Some(Decimal::ZERO),
        })
        .await
        .expect("bob account");

    BenchSetup { engine, alice }
}

fn bench_transfer_throughput(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let setup = rt.block_on(setup());

    c.bench_function("orchestrated_transfer", |b| {
        b.to_async(&rt).iter(|| {
            let service = setup.engine.transaction_service.clone();
            let sender = setup.alice.id;
            async move {
                service
                    .transfer(sender, "bob@example.com", Decimal::ONE, None)
                    .await
                    .expect("transfer")
            }
        })
    });
}

fn bench_ledger_credit(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let setup = rt.block_on(setup());
    let account_id = rt
        .block_on(setup.engine.accounts.find_by_owner(setup.alice.id))
        .expect("lookup")
        .expect("account")
        .id;

    c.bench_function("ledger_credit", |b| {
        b.to_async(&rt).iter(|| {
            let ledger = setup.engine.ledger.clone();
            async move { ledger.credit(account_id, Decimal::ONE).await.expect("credit") }
        })
    });
}

criterion_group!(benches, bench_transfer_throughput, bench_ledger_credit);
criterion_main!(benches);
