use crate::collaborators::{UserDirectory, UserRef};
use crate::error::{AppError, Result};
use crate::events::{EventEnvelope, EventType, SideEffectDispatcher, TransactionEvent};
use crate::models::{
    Account, AccountStatus, Transaction, TransactionStateMachine, TransactionStatus,
    TransactionType,
};
use crate::observability::{get_metrics, mask_amount};
use crate::repositories::{AccountRepository, TransactionRepository};
use crate::services::compliance_service::ComplianceService;
use crate::services::fee_service::FeeCalculator;
use crate::services::ledger_service::LedgerService;
use crate::services::limit_service::LimitService;
use crate::services::numbering::TransactionNumberGenerator;
use crate::services::risk_service::{RiskOutcome, RiskService};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub(crate) fn type_label(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Deposit => "DEPOSIT",
        TransactionType::Transfer => "TRANSFER",
        TransactionType::Payment => "PAYMENT",
        TransactionType::Reversal => "REVERSAL",
    }
}

/// The transaction orchestrator: entry point for every money movement. It
/// sequences limit checks, fee computation, risk scoring, the AML gate, the
/// atomic ledger mutation and the terminal state transition, then hands the
/// result to the side-effect dispatcher.
///
/// Every hard failure is persisted on the transaction (status FAILED plus a
/// reason) before the error surfaces, so each attempt stays auditable.
pub struct TransactionService {
    directory: Arc<dyn UserDirectory>,
    accounts: Arc<AccountRepository>,
    transactions: Arc<TransactionRepository>,
    ledger: Arc<LedgerService>,
    fees: FeeCalculator,
    risk: Arc<RiskService>,
    compliance: Arc<ComplianceService>,
    limits: Arc<LimitService>,
    numbering: TransactionNumberGenerator,
    dispatcher: SideEffectDispatcher,
}

impl TransactionService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        accounts: Arc<AccountRepository>,
        transactions: Arc<TransactionRepository>,
        ledger: Arc<LedgerService>,
        fees: FeeCalculator,
        risk: Arc<RiskService>,
        compliance: Arc<ComplianceService>,
        limits: Arc<LimitService>,
        numbering: TransactionNumberGenerator,
        dispatcher: SideEffectDispatcher,
    ) -> Self {
        Self {
            directory,
            accounts,
            transactions,
            ledger,
            fees,
            risk,
            compliance,
            limits,
            numbering,
            dispatcher,
        }
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

    async fn resolve_user(&self, user_id: Uuid) -> Result<UserRef> {
        self.directory
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", user_id)))
    }

    async fn resolve_account(&self, user_id: Uuid) -> Result<Account> {
        self.accounts
            .find_by_owner(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account for user '{}'", user_id)))
    }

    /// Persists the failure on the transaction and emits the failure event,
    /// then hands the original error back to the caller.
    async fn fail_transaction(
        &self,
        transaction: &Transaction,
        user_id: Uuid,
        err: AppError,
    ) -> AppError {
        let mut failed = transaction.clone();
        failed.fail(err.to_string());
        if let Err(update_err) = self.transactions.update(&failed).await {
            error!(
                transaction = %failed.transaction_number,
                %update_err,
                "failed to persist transaction failure"
            );
        }
        get_metrics()
            .record_transaction_failed(type_label(failed.transaction_type), err.kind());
        warn!(
            transaction = %failed.transaction_number,
            reason = %err,
            "transaction failed"
        );
        self.dispatcher.dispatch(EventEnvelope::new(
            EventType::TransactionFailed,
            TransactionEvent::from_transaction(&failed, user_id),
        ));
        err
    }

    /// Moves the transaction to COMPLETED and emits the completion event.
    async fn complete_transaction(
        &self,
        transaction: &Transaction,
        user_id: Uuid,
    ) -> Result<Transaction> {
        TransactionStateMachine::transition(transaction.status, TransactionStatus::Completed)?;
        let mut completed = transaction.clone();
        completed.complete();
        let completed = self.transactions.update(&completed).await?;

        get_metrics()
            .record_transaction_completed(type_label(completed.transaction_type), &completed.currency);
        info!(
            transaction = %completed.transaction_number,
            amount = %mask_amount(&completed.amount),
            "transaction completed"
        );
        self.dispatcher.dispatch(EventEnvelope::new(
            EventType::TransactionCompleted,
            TransactionEvent::from_transaction(&completed, user_id),
        ));
        Ok(completed)
    }

    /// Applies the actions demanded by matched fraud rules and turns a
    /// blocking outcome into an error.
    async fn enforce_risk(&self, outcome: &RiskOutcome, account: &Account) -> Result<()> {
        if let Some(rule) = outcome.freeze_demand() {
            warn!(
                account_id = %account.id,
                rule = %rule.name,
                "fraud rule froze the account"
            );
            self.accounts
                .update_status(account.id, AccountStatus::Suspended)
                .await?;
            return Err(AppError::FraudBlocked(format!(
                "fraud rule '{}' froze the account",
                rule.name
            )));
        }
        if let Some(reason) = outcome.hard_block_reason() {
            return Err(AppError::FraudBlocked(reason));
        }
        Ok(())
    }

    /// Deposits external funds into the user's wallet. Risk scoring is
    /// informational for deposits; the AML gate is not.
    pub async fn deposit(
        &self,
        user_id: Uuid,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<Transaction> {
        Self::ensure_positive(amount)?;
        let user = self.resolve_user(user_id).await?;
        let account = self.resolve_account(user_id).await?;

        let number = self.numbering.next_unique(&self.transactions).await?;
        let mut tx = Transaction::deposit(number, account.id, amount, account.currency.clone());
        if let Some(description) = description {
            tx = tx.with_description(description);
        }
        let tx = self.transactions.create(tx).await?;
        get_metrics().record_transaction_created(type_label(tx.transaction_type), &tx.currency);

        self.risk.evaluate(&account, user.id, &tx).await?;

        if let Err(err) = self.compliance.check(&user, &account, &tx, Utc::now()).await {
            return Err(self.fail_transaction(&tx, user.id, err).await);
        }

        if let Err(err) = self.ledger.credit(account.id, amount).await {
            return Err(self.fail_transaction(&tx, user.id, err).await);
        }

        self.complete_transaction(&tx, user.id).await
    }

    /// Transfers funds to another wallet, addressed by the receiver's email.
    /// The sender pays `amount + fee`; the receiver gets `amount`; the fee is
    /// retained by the platform.
    pub async fn transfer(
        &self,
        sender_user_id: Uuid,
        receiver_email: &str,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<Transaction> {
        Self::ensure_positive(amount)?;
        let sender = self.resolve_user(sender_user_id).await?;
        let sender_account = self.resolve_account(sender_user_id).await?;

        let receiver = self
            .directory
            .find_user_by_email(receiver_email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user with email '{}'", receiver_email)))?;
        if receiver.id == sender.id {
            return Err(AppError::Validation(
                "cannot transfer to your own wallet".to_string(),
            ));
        }
        let receiver_account = self.resolve_account(receiver.id).await?;
        if sender_account.currency != receiver_account.currency {
            return Err(AppError::Validation(format!(
                "currency mismatch: {} vs {}",
                sender_account.currency, receiver_account.currency
            )));
        }

        let fee = self.fees.fee(amount);
        let number = self.numbering.next_unique(&self.transactions).await?;
        let mut tx = Transaction::transfer(
            number,
            sender_account.id,
            receiver_account.id,
            amount,
            fee,
            sender_account.currency.clone(),
        );
        if let Some(description) = description {
            tx = tx.with_description(description);
        }
        let tx = self.transactions.create(tx).await?;
        get_metrics().record_transaction_created(type_label(tx.transaction_type), &tx.currency);

        self.run_outflow_checks(&sender, &sender_account, &tx).await?;

        // Debit covers amount plus fee; only the amount reaches the receiver.
        // The authoritative sufficiency check runs inside the ledger's
        // critical section.
        if let Err(err) = self
            .ledger
            .transfer(sender_account.id, receiver_account.id, tx.outflow(), amount)
            .await
        {
            return Err(self.fail_transaction(&tx, sender.id, err).await);
        }

        self.complete_transaction(&tx, sender.id).await
    }

    /// Pays a merchant from the user's wallet. The wallet is debited
    /// `amount + fee`; settlement towards the merchant happens outside this
    /// engine.
    pub async fn pay_from_wallet(
        &self,
        user_id: Uuid,
        amount: Decimal,
        description: Option<String>,
        merchant_id: Option<String>,
    ) -> Result<Transaction> {
        Self::ensure_positive(amount)?;
        let user = self.resolve_user(user_id).await?;
        let account = self.resolve_account(user_id).await?;

        let fee = self.fees.fee(amount);
        let number = self.numbering.next_unique(&self.transactions).await?;
        let mut tx = Transaction::payment(
            number,
            account.id,
            amount,
            fee,
            account.currency.clone(),
        );
        if let Some(description) = description {
            tx = tx.with_description(description);
        }
        if let Some(merchant_id) = merchant_id {
            tx = tx.with_metadata(serde_json::json!({ "merchant_id": merchant_id }));
        }
        let tx = self.transactions.create(tx).await?;
        get_metrics().record_transaction_created(type_label(tx.transaction_type), &tx.currency);

        self.run_outflow_checks(&user, &account, &tx).await?;

        if let Err(err) = self.ledger.debit(account.id, tx.outflow()).await {
            return Err(self.fail_transaction(&tx, user.id, err).await);
        }

        self.complete_transaction(&tx, user.id).await
    }

    /// The shared pre-settlement pipeline for outgoing money: limit check,
    /// advisory balance check, risk scoring with rule actions, AML gate.
    /// Short-circuits on the first failure, persisting it on the transaction.
    async fn run_outflow_checks(
        &self,
        user: &UserRef,
        account: &Account,
        tx: &Transaction,
    ) -> Result<()> {
        if let Err(err) = self
            .limits
            .enforce(account.id, user.role, tx, Utc::now())
            .await
        {
            return Err(self.fail_transaction(tx, user.id, err).await);
        }

        // Advisory: catches obviously underfunded requests before the
        // heavier checks run. The binding check happens under the lock.
        let available = self.ledger.balance(account.id).await?;
        if available < tx.outflow() {
            let err = AppError::InsufficientFunds {
                requested: tx.outflow(),
                available,
            };
            return Err(self.fail_transaction(tx, user.id, err).await);
        }

        match self.risk.evaluate(account, user.id, tx).await {
            Ok(outcome) => {
                if let Err(err) = self.enforce_risk(&outcome, account).await {
                    return Err(self.fail_transaction(tx, user.id, err).await);
                }
            }
            Err(err) => return Err(err),
        }

        if let Err(err) = self.compliance.check(user, account, tx, Utc::now()).await {
            return Err(self.fail_transaction(tx, user.id, err).await);
        }

        Ok(())
    }

    pub async fn find_transaction(&self, id: Uuid) -> Result<Transaction> {
        self.transactions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("transaction '{}'", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_labels() {
        assert_eq!(type_label(TransactionType::Deposit), "DEPOSIT");
        assert_eq!(type_label(TransactionType::Transfer), "TRANSFER");
        assert_eq!(type_label(TransactionType::Payment), "PAYMENT");
        assert_eq!(type_label(TransactionType::Reversal), "REVERSAL");
    }
}
