use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// External funds entering a wallet.
    Deposit,
    /// Wallet-to-wallet movement.
    Transfer,
    /// Wallet payment to an external party (merchant).
    Payment,
    /// Compensating transaction created by the reversal workflow.
    Reversal,
}

impl TransactionType {
    /// Returns true if transactions of this type may be reversed.
    /// Compensating transactions are themselves never reversible.
    pub fn is_reversible(&self) -> bool {
        !matches!(self, TransactionType::Reversal)
    }
}

/// Lifecycle state. Transitions are monotonic: a terminal transaction is
/// never re-opened; undoing a completed transaction happens through a new
/// compensating transaction instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }
}

/// Guards status transitions.
#[derive(Debug, Clone)]
pub struct TransactionStateMachine;

impl TransactionStateMachine {
    /// Returns valid next states from the current state.
    pub fn valid_transitions(current: TransactionStatus) -> Vec<TransactionStatus> {
        match current {
            TransactionStatus::Pending => {
                vec![TransactionStatus::Completed, TransactionStatus::Failed]
            }
            TransactionStatus::Completed => vec![],
            TransactionStatus::Failed => vec![],
        }
    }

    pub fn can_transition(from: TransactionStatus, to: TransactionStatus) -> bool {
        Self::valid_transitions(from).contains(&to)
    }

    pub fn transition(from: TransactionStatus, to: TransactionStatus) -> Result<TransactionStatus> {
        if Self::can_transition(from, to) {
            Ok(to)
        } else {
            Err(AppError::Validation(format!(
                "invalid state transition from {:?} to {:?}",
                from, to
            )))
        }
    }
}

/// A money-movement record. Every attempt is persisted, including failed
/// ones, so the full history is auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    /// Globally unique, immutable once assigned.
    pub transaction_number: String,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    /// Debited account; absent for deposits.
    pub sender_account_id: Option<Uuid>,
    /// Credited account; absent for external payments.
    pub receiver_account_id: Option<Uuid>,
    pub amount: Decimal,
    pub fee_amount: Decimal,
    /// Total effect on the debited side (`amount + fee`), or `amount` when
    /// nothing is debited.
    pub net_amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub failure_reason: Option<String>,
    /// Set on compensating transactions; links back to the original.
    pub reversal_of: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    fn new(
        transaction_number: String,
        transaction_type: TransactionType,
        sender_account_id: Option<Uuid>,
        receiver_account_id: Option<Uuid>,
        amount: Decimal,
        fee_amount: Decimal,
        currency: String,
    ) -> Self {
        let net_amount = if sender_account_id.is_some() {
            amount + fee_amount
        } else {
            amount
        };
        Self {
            id: Uuid::new_v4(),
            transaction_number,
            transaction_type,
            status: TransactionStatus::Pending,
            sender_account_id,
            receiver_account_id,
            amount,
            fee_amount,
            net_amount,
            currency,
            description: None,
            failure_reason: None,
            reversal_of: None,
            metadata: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn deposit(
        transaction_number: impl Into<String>,
        receiver_account_id: Uuid,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self::new(
            transaction_number.into(),
            TransactionType::Deposit,
            None,
            Some(receiver_account_id),
            amount,
            Decimal::ZERO,
            currency.into(),
        )
    }

    pub fn transfer(
        transaction_number: impl Into<String>,
        sender_account_id: Uuid,
        receiver_account_id: Uuid,
        amount: Decimal,
        fee_amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self::new(
            transaction_number.into(),
            TransactionType::Transfer,
            Some(sender_account_id),
            Some(receiver_account_id),
            amount,
            fee_amount,
            currency.into(),
        )
    }

    pub fn payment(
        transaction_number: impl Into<String>,
        sender_account_id: Uuid,
        amount: Decimal,
        fee_amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self::new(
            transaction_number.into(),
            TransactionType::Payment,
            Some(sender_account_id),
            None,
            amount,
            fee_amount,
            currency.into(),
        )
    }

    /// Builds the compensating transaction for a reversal: money moves in
    /// the opposite direction of the original.
    pub fn reversal(
        transaction_number: impl Into<String>,
        original: &Transaction,
        amount: Decimal,
        fee_refund: Decimal,
    ) -> Self {
        let mut tx = Self::new(
            transaction_number.into(),
            TransactionType::Reversal,
            original.receiver_account_id,
            original.sender_account_id,
            amount,
            fee_refund,
            original.currency.clone(),
        );
        tx.reversal_of = Some(original.id);
        tx
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn is_reversal(&self) -> bool {
        self.transaction_type == TransactionType::Reversal || self.reversal_of.is_some()
    }

    /// Amount leaving the sender's account, fee included.
    pub fn outflow(&self) -> Decimal {
        if self.sender_account_id.is_some() {
            self.amount + self.fee_amount
        } else {
            Decimal::ZERO
        }
    }

    pub fn complete(&mut self) {
        self.status = TransactionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = TransactionStatus::Failed;
        self.failure_reason = Some(reason.into());
    }

    pub fn can_process(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    pub fn can_reverse(&self) -> bool {
        self.status == TransactionStatus::Completed
            && self.transaction_type.is_reversible()
            && !self.is_reversal()
    }
}
