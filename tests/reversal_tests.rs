mod common;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;
use wallet_engine::error::AppError;
use wallet_engine::models::{
    ReversalStatus, ReversalType, Transaction, TransactionStatus, TransactionType, UserRole,
};

#[tokio::test]
async fn test_full_transfer_reversal_restores_both_balances() {
    let ctx = common::setup_engine().await;
    let (alice, alice_account) = ctx
        .user_with_account("alice@example.com", UserRole::User, true, dec!(1000))
        .await;
    let (_, bob_account) = ctx
        .user_with_account("bob@example.com", UserRole::User, true, dec!(500))
        .await;

    let transfer = ctx
        .engine
        .transaction_service
        .transfer(alice.id, "bob@example.com", dec!(100), None)
        .await
        .unwrap();
    // fee(100) = 2.90.
    assert_eq!(
        ctx.engine.ledger.balance(alice_account.id).await.unwrap(),
        dec!(897.10)
    );
    assert_eq!(
        ctx.engine.ledger.balance(bob_account.id).await.unwrap(),
        dec!(600)
    );

    let admin = Uuid::new_v4();
    let reversal = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, transfer.id, ReversalType::Full, dec!(100), "sent in error")
        .await
        .unwrap();
    assert_eq!(reversal.status, ReversalStatus::Pending);

    let reversal = ctx
        .engine
        .reversal_service
        .approve_reversal(reversal.id, admin, Some("verified".to_string()))
        .await
        .unwrap();
    assert_eq!(reversal.status, ReversalStatus::Approved);

    let reversal = ctx
        .engine
        .reversal_service
        .process_reversal(reversal.id, admin, None)
        .await
        .unwrap();
    assert_eq!(reversal.status, ReversalStatus::Processed);

    // Both parties are back at their pre-transfer balances (the full
    // reversal also refunds the retained fee).
    assert_eq!(
        ctx.engine.ledger.balance(alice_account.id).await.unwrap(),
        dec!(1000)
    );
    assert_eq!(
        ctx.engine.ledger.balance(bob_account.id).await.unwrap(),
        dec!(500)
    );

    // The compensating transaction is linked and runs the opposite way.
    let comp_id = reversal.compensating_transaction_id.unwrap();
    let comp = ctx
        .engine
        .transactions
        .find_by_id(comp_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(comp.transaction_type, TransactionType::Reversal);
    assert_eq!(comp.status, TransactionStatus::Completed);
    assert_eq!(comp.sender_account_id, Some(bob_account.id));
    assert_eq!(comp.receiver_account_id, Some(alice_account.id));
    assert_eq!(comp.reversal_of, Some(transfer.id));

    // The original transaction object itself was never mutated.
    let original = ctx
        .engine
        .transactions
        .find_by_id(transfer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(original.status, TransactionStatus::Completed);
}

#[tokio::test]
async fn test_partial_reversal_moves_only_the_requested_amount() {
    let ctx = common::setup_engine().await;
    let (alice, alice_account) = ctx
        .user_with_account("alice@example.com", UserRole::User, true, dec!(1000))
        .await;
    let (_, bob_account) = ctx
        .user_with_account("bob@example.com", UserRole::User, true, dec!(0))
        .await;

    let transfer = ctx
        .engine
        .transaction_service
        .transfer(alice.id, "bob@example.com", dec!(200), None)
        .await
        .unwrap();

    let admin = Uuid::new_v4();
    let reversal = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, transfer.id, ReversalType::Partial, dec!(50), "partial dispute")
        .await
        .unwrap();
    ctx.engine
        .reversal_service
        .approve_reversal(reversal.id, admin, None)
        .await
        .unwrap();
    ctx.engine
        .reversal_service
        .process_reversal(reversal.id, admin, None)
        .await
        .unwrap();

    // No fee refund on partial reversals: alice paid 202.99, got 50 back.
    assert_eq!(
        ctx.engine.ledger.balance(alice_account.id).await.unwrap(),
        dec!(847.01)
    );
    assert_eq!(
        ctx.engine.ledger.balance(bob_account.id).await.unwrap(),
        dec!(150)
    );
}

#[tokio::test]
async fn test_reversal_amount_bounds_by_type() {
    let ctx = common::setup_engine().await;
    let (alice, _) = ctx
        .user_with_account("alice@example.com", UserRole::User, true, dec!(1000))
        .await;
    ctx.user_with_account("bob@example.com", UserRole::User, true, dec!(0))
        .await;

    let transfer = ctx
        .engine
        .transaction_service
        .transfer(alice.id, "bob@example.com", dec!(100), None)
        .await
        .unwrap();

    // FULL must match exactly.
    let err = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, transfer.id, ReversalType::Full, dec!(99), "wrong amount")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReversalAmountInvalid(_)));

    // PARTIAL must be strictly below the original.
    let err = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, transfer.id, ReversalType::Partial, dec!(100), "too much")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReversalAmountInvalid(_)));

    // REFUND may not exceed the original.
    let err = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, transfer.id, ReversalType::Refund, dec!(100.01), "too much")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReversalAmountInvalid(_)));

    // A refund of the full amount is fine.
    assert!(ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, transfer.id, ReversalType::Refund, dec!(100), "buyer refund")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_failed_transactions_are_not_reversible() {
    let ctx = common::setup_engine().await;
    let (alice, _) = ctx
        .user_with_account("alice@example.com", UserRole::User, true, dec!(10))
        .await;
    ctx.user_with_account("bob@example.com", UserRole::User, true, dec!(0))
        .await;

    let err = ctx
        .engine
        .transaction_service
        .transfer(alice.id, "bob@example.com", dec!(100), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds { .. }));

    let failed = ctx
        .engine
        .transactions
        .list_for_account(
            ctx.engine
                .accounts
                .find_by_owner(alice.id)
                .await
                .unwrap()
                .unwrap()
                .id,
        )
        .await
        .pop()
        .unwrap();
    assert_eq!(failed.status, TransactionStatus::Failed);

    let err = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, failed.id, ReversalType::Full, dec!(100), "oops")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReversalIneligible(_)));
}

#[tokio::test]
async fn test_compensating_transactions_are_not_reversible() {
    let ctx = common::setup_engine().await;
    let (alice, _) = ctx
        .user_with_account("alice@example.com", UserRole::User, true, dec!(1000))
        .await;
    ctx.user_with_account("bob@example.com", UserRole::User, true, dec!(0))
        .await;

    let transfer = ctx
        .engine
        .transaction_service
        .transfer(alice.id, "bob@example.com", dec!(100), None)
        .await
        .unwrap();

    let admin = Uuid::new_v4();
    let reversal = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, transfer.id, ReversalType::Full, dec!(100), "error")
        .await
        .unwrap();
    ctx.engine
        .reversal_service
        .approve_reversal(reversal.id, admin, None)
        .await
        .unwrap();
    let reversal = ctx
        .engine
        .reversal_service
        .process_reversal(reversal.id, admin, None)
        .await
        .unwrap();

    let comp_id = reversal.compensating_transaction_id.unwrap();
    let err = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, comp_id, ReversalType::Full, dec!(100), "reverse the reversal")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReversalIneligible(_)));
}

#[tokio::test]
async fn test_stale_transactions_are_not_reversible() {
    let ctx = common::setup_engine().await;
    let (alice, alice_account) = ctx
        .user_with_account("alice@example.com", UserRole::User, true, dec!(1000))
        .await;
    let (_, bob_account) = ctx
        .user_with_account("bob@example.com", UserRole::User, true, dec!(0))
        .await;

    // Plant a 91-day-old completed transfer directly in the store.
    let mut old = Transaction::transfer(
        "TXN-OLD",
        alice_account.id,
        bob_account.id,
        dec!(10),
        dec!(0.30),
        "USD",
    );
    old.created_at = Utc::now() - Duration::days(91);
    old.complete();
    let old = ctx.engine.transactions.create(old).await.unwrap();

    let err = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, old.id, ReversalType::Full, dec!(10), "too late")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReversalIneligible(_)));
}

#[tokio::test]
async fn test_rejected_reversals_cannot_be_processed() {
    let ctx = common::setup_engine().await;
    let (alice, _) = ctx
        .user_with_account("alice@example.com", UserRole::User, true, dec!(1000))
        .await;
    ctx.user_with_account("bob@example.com", UserRole::User, true, dec!(0))
        .await;

    let transfer = ctx
        .engine
        .transaction_service
        .transfer(alice.id, "bob@example.com", dec!(100), None)
        .await
        .unwrap();

    let admin = Uuid::new_v4();
    let reversal = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, transfer.id, ReversalType::Full, dec!(100), "disputed")
        .await
        .unwrap();
    let reversal = ctx
        .engine
        .reversal_service
        .reject_reversal(reversal.id, admin, Some("no grounds".to_string()))
        .await
        .unwrap();
    assert_eq!(reversal.status, ReversalStatus::Rejected);

    let err = ctx
        .engine
        .reversal_service
        .process_reversal(reversal.id, admin, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Unapproved (pending) reversals cannot be processed either.
    let pending = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, transfer.id, ReversalType::Partial, dec!(10), "partial")
        .await
        .unwrap();
    assert!(ctx
        .engine
        .reversal_service
        .process_reversal(pending.id, admin, None)
        .await
        .is_err());
}

#[tokio::test]
async fn test_reversals_cannot_exceed_the_original_in_aggregate() {
    let ctx = common::setup_engine().await;
    let (alice, _) = ctx
        .user_with_account("alice@example.com", UserRole::User, true, dec!(1000))
        .await;
    ctx.user_with_account("bob@example.com", UserRole::User, true, dec!(0))
        .await;

    let transfer = ctx
        .engine
        .transaction_service
        .transfer(alice.id, "bob@example.com", dec!(100), None)
        .await
        .unwrap();

    ctx.engine
        .reversal_service
        .request_reversal(alice.id, transfer.id, ReversalType::Refund, dec!(80), "first")
        .await
        .unwrap();

    // 80 already reserved; another 30 would over-reverse the original 100.
    let err = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, transfer.id, ReversalType::Refund, dec!(30), "second")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReversalAmountInvalid(_)));

    // A second request inside the remaining headroom is fine.
    assert!(ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, transfer.id, ReversalType::Refund, dec!(20), "rest")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_deposit_reversal_debits_the_wallet() {
    let ctx = common::setup_engine().await;
    let (alice, account) = ctx
        .user_with_account("alice@example.com", UserRole::User, true, dec!(0))
        .await;

    let deposit = ctx
        .engine
        .transaction_service
        .deposit(alice.id, dec!(500), None)
        .await
        .unwrap();

    let admin = Uuid::new_v4();
    let reversal = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, deposit.id, ReversalType::Full, dec!(500), "chargeback")
        .await
        .unwrap();
    ctx.engine
        .reversal_service
        .approve_reversal(reversal.id, admin, None)
        .await
        .unwrap();
    ctx.engine
        .reversal_service
        .process_reversal(reversal.id, admin, None)
        .await
        .unwrap();

    assert_eq!(ctx.engine.ledger.balance(account.id).await.unwrap(), dec!(0));
}

#[tokio::test]
async fn test_processing_fails_retryably_when_counterparty_cannot_pay() {
    let ctx = common::setup_engine().await;
    let (alice, _) = ctx
        .user_with_account("alice@example.com", UserRole::User, true, dec!(1000))
        .await;
    let (bob, _) = ctx
        .user_with_account("bob@example.com", UserRole::User, true, dec!(0))
        .await;

    let transfer = ctx
        .engine
        .transaction_service
        .transfer(alice.id, "bob@example.com", dec!(100), None)
        .await
        .unwrap();

    // Bob spends most of the received money before the reversal processes.
    ctx.engine
        .transaction_service
        .pay_from_wallet(bob.id, dec!(80), None, None)
        .await
        .unwrap();

    let admin = Uuid::new_v4();
    let reversal = ctx
        .engine
        .reversal_service
        .request_reversal(alice.id, transfer.id, ReversalType::Full, dec!(100), "dispute")
        .await
        .unwrap();
    ctx.engine
        .reversal_service
        .approve_reversal(reversal.id, admin, None)
        .await
        .unwrap();

    let err = ctx
        .engine
        .reversal_service
        .process_reversal(reversal.id, admin, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds { .. }));

    // The reversal stays approved for a later retry.
    let stored = ctx
        .engine
        .reversal_service
        .get_reversal(reversal.id)
        .await
        .unwrap();
    assert_eq!(stored.status, ReversalStatus::Approved);
    assert!(stored.compensating_transaction_id.is_none());
}
