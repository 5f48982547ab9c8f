use crate::config::ReversalSettings;
use crate::error::{AppError, Result};
use crate::events::{EventEnvelope, EventType, SideEffectDispatcher, TransactionEvent};
use crate::models::{
    ReversalStatus, ReversalType, Transaction, TransactionReversal,
};
use crate::observability::get_metrics;
use crate::repositories::{ReversalRepository, TransactionRepository};
use crate::services::ledger_service::LedgerService;
use crate::services::numbering::TransactionNumberGenerator;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

fn reversal_type_label(reversal_type: ReversalType) -> &'static str {
    match reversal_type {
        ReversalType::Full => "FULL",
        ReversalType::Partial => "PARTIAL",
        ReversalType::Refund => "REFUND",
    }
}

/// The reversal workflow: request -> admin approval -> processing. Processing
/// creates a compensating transaction in the opposite direction and links it
/// to the reversal record; the original transaction is never mutated.
pub struct ReversalService {
    transactions: Arc<TransactionRepository>,
    reversals: Arc<ReversalRepository>,
    ledger: Arc<LedgerService>,
    numbering: TransactionNumberGenerator,
    dispatcher: SideEffectDispatcher,
    eligibility_days: i64,
}

impl ReversalService {
    pub fn new(
        transactions: Arc<TransactionRepository>,
        reversals: Arc<ReversalRepository>,
        ledger: Arc<LedgerService>,
        numbering: TransactionNumberGenerator,
        dispatcher: SideEffectDispatcher,
        settings: &ReversalSettings,
    ) -> Self {
        Self {
            transactions,
            reversals,
            ledger,
            numbering,
            dispatcher,
            eligibility_days: settings.eligibility_days,
        }
    }

    async fn find_original(&self, transaction_id: Uuid) -> Result<Transaction> {
        self.transactions
            .find_by_id(transaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("transaction '{}'", transaction_id)))
    }

    async fn find_reversal(&self, reversal_id: Uuid) -> Result<TransactionReversal> {
        self.reversals
            .find_by_id(reversal_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("reversal '{}'", reversal_id)))
    }

    /// Files a reversal request against a completed transaction.
    pub async fn request_reversal(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        reversal_type: ReversalType,
        amount: Decimal,
        reason: impl Into<String>,
    ) -> Result<TransactionReversal> {
        let original = self.find_original(transaction_id).await?;

        if original.is_reversal() {
            return Err(AppError::ReversalIneligible(
                "a compensating transaction cannot itself be reversed".to_string(),
            ));
        }
        if !original.can_reverse() {
            return Err(AppError::ReversalIneligible(format!(
                "only completed transactions can be reversed (status: {:?})",
                original.status
            )));
        }
        let age = Utc::now() - original.created_at;
        if age > Duration::days(self.eligibility_days) {
            return Err(AppError::ReversalIneligible(format!(
                "transaction is older than {} days",
                self.eligibility_days
            )));
        }

        TransactionReversal::validate_amount(reversal_type, amount, original.amount)?;

        // Prior reversals (pending, approved or processed) count against the
        // original amount so the transaction cannot be over-reversed.
        let already_reserved: Decimal = self
            .reversals
            .list_for_transaction(original.id)
            .await
            .iter()
            .filter(|r| r.status != ReversalStatus::Rejected)
            .map(|r| r.amount)
            .sum();
        if already_reserved + amount > original.amount {
            return Err(AppError::ReversalAmountInvalid(format!(
                "existing reversals already cover {} of {}",
                already_reserved, original.amount
            )));
        }

        let reversal = self
            .reversals
            .create(TransactionReversal::new(
                original.id,
                user_id,
                reversal_type,
                amount,
                reason,
            ))
            .await;
        info!(
            reversal_id = %reversal.id,
            transaction = %original.transaction_number,
            "reversal requested"
        );
        Ok(reversal)
    }

    pub async fn approve_reversal(
        &self,
        reversal_id: Uuid,
        admin_id: Uuid,
        notes: Option<String>,
    ) -> Result<TransactionReversal> {
        let mut reversal = self.find_reversal(reversal_id).await?;
        reversal.approve(admin_id, notes)?;
        self.reversals.update(&reversal).await
    }

    pub async fn reject_reversal(
        &self,
        reversal_id: Uuid,
        admin_id: Uuid,
        notes: Option<String>,
    ) -> Result<TransactionReversal> {
        let mut reversal = self.find_reversal(reversal_id).await?;
        reversal.reject(admin_id, notes)?;
        self.reversals.update(&reversal).await
    }

    /// Executes an approved reversal: creates the compensating transaction,
    /// moves the money back through the ledger and links the two records.
    /// If the ledger rejects the movement (for example the counterparty has
    /// already spent the funds) the reversal stays APPROVED and can be
    /// retried.
    pub async fn process_reversal(
        &self,
        reversal_id: Uuid,
        admin_id: Uuid,
        notes: Option<String>,
    ) -> Result<TransactionReversal> {
        let mut reversal = self.find_reversal(reversal_id).await?;
        if reversal.status != ReversalStatus::Approved {
            return Err(AppError::Validation(format!(
                "cannot process a reversal in state {:?}",
                reversal.status
            )));
        }
        let original = self.find_original(reversal.original_transaction_id).await?;

        // Full reversals also return the retained fee, so both parties end
        // up at their pre-transaction balances.
        let fee_refund = if reversal.reversal_type == ReversalType::Full {
            original.fee_amount
        } else {
            Decimal::ZERO
        };

        let number = self.numbering.next_unique(&self.transactions).await?;
        let compensating =
            Transaction::reversal(number, &original, reversal.amount, fee_refund)
                .with_description(format!(
                    "reversal of {} ({})",
                    original.transaction_number, reversal.reason
                ));
        let compensating = self.transactions.create(compensating).await?;

        let moved = match (original.sender_account_id, original.receiver_account_id) {
            // Transfer: the original receiver pays the amount back; the
            // original sender additionally recovers the fee on full reversals.
            (Some(sender), Some(receiver)) => {
                self.ledger
                    .transfer(receiver, sender, reversal.amount, reversal.amount + fee_refund)
                    .await
                    .map(|_| ())
            }
            // Deposit: the credited wallet pays the amount back out.
            (None, Some(receiver)) => self
                .ledger
                .debit(receiver, reversal.amount)
                .await
                .map(|_| ()),
            // Payment: the debited wallet is made whole again.
            (Some(sender), None) => self
                .ledger
                .credit(sender, reversal.amount + fee_refund)
                .await
                .map(|_| ()),
            (None, None) => Err(AppError::Validation(
                "original transaction has no accounts to compensate".to_string(),
            )),
        };

        if let Err(err) = moved {
            let mut failed = compensating.clone();
            failed.fail(err.to_string());
            self.transactions.update(&failed).await?;
            warn!(
                reversal_id = %reversal.id,
                reason = %err,
                "reversal processing failed, reversal stays approved"
            );
            return Err(err);
        }

        let mut completed = compensating.clone();
        completed.complete();
        let completed = self.transactions.update(&completed).await?;

        reversal.reviewed_by.get_or_insert(admin_id);
        if notes.is_some() {
            reversal.review_notes = notes;
        }
        reversal.mark_processed(completed.id)?;
        let reversal = self.reversals.update(&reversal).await?;

        get_metrics().record_transaction_reversed(reversal_type_label(reversal.reversal_type));
        info!(
            reversal_id = %reversal.id,
            compensating = %completed.transaction_number,
            "reversal processed"
        );
        self.dispatcher.dispatch(EventEnvelope::new(
            EventType::TransactionReversed,
            TransactionEvent::from_transaction(&completed, reversal.requested_by),
        ));
        Ok(reversal)
    }

    pub async fn get_reversal(&self, reversal_id: Uuid) -> Result<TransactionReversal> {
        self.find_reversal(reversal_id).await
    }
}
