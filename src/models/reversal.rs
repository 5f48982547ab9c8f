use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How much of the original transaction a reversal undoes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReversalType {
    /// Must equal the original amount exactly.
    Full,
    /// Strictly less than the original amount, greater than zero.
    Partial,
    /// Up to and including the original amount.
    Refund,
}

/// Workflow state: PENDING -> APPROVED -> PROCESSED, or PENDING -> REJECTED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReversalStatus {
    Pending,
    Approved,
    Rejected,
    Processed,
}

impl ReversalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReversalStatus::Rejected | ReversalStatus::Processed)
    }
}

/// An admin-gated request to undo a completed transaction with a new
/// compensating transaction. The original transaction is never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReversal {
    pub id: Uuid,
    pub original_transaction_id: Uuid,
    pub requested_by: Uuid,
    pub reversal_type: ReversalType,
    pub amount: Decimal,
    pub reason: String,
    pub status: ReversalStatus,
    pub reviewed_by: Option<Uuid>,
    pub review_notes: Option<String>,
    /// Set once processed: the compensating transaction this reversal produced.
    pub compensating_transaction_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl TransactionReversal {
    pub fn new(
        original_transaction_id: Uuid,
        requested_by: Uuid,
        reversal_type: ReversalType,
        amount: Decimal,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_transaction_id,
            requested_by,
            reversal_type,
            amount,
            reason: reason.into(),
            status: ReversalStatus::Pending,
            reviewed_by: None,
            review_notes: None,
            compensating_transaction_id: None,
            created_at: Utc::now(),
            reviewed_at: None,
            processed_at: None,
        }
    }

    /// Checks the requested amount against the original amount for the given
    /// reversal type.
    pub fn validate_amount(
        reversal_type: ReversalType,
        requested: Decimal,
        original: Decimal,
    ) -> Result<()> {
        if requested <= Decimal::ZERO {
            return Err(AppError::ReversalAmountInvalid(format!(
                "reversal amount must be positive, got {}",
                requested
            )));
        }
        match reversal_type {
            ReversalType::Full if requested != original => {
                Err(AppError::ReversalAmountInvalid(format!(
                    "full reversal must equal the original amount {} (got {})",
                    original, requested
                )))
            }
            ReversalType::Partial if requested >= original => {
                Err(AppError::ReversalAmountInvalid(format!(
                    "partial reversal must be less than the original amount {} (got {})",
                    original, requested
                )))
            }
            ReversalType::Refund if requested > original => {
                Err(AppError::ReversalAmountInvalid(format!(
                    "refund cannot exceed the original amount {} (got {})",
                    original, requested
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn approve(&mut self, reviewer_id: Uuid, notes: Option<String>) -> Result<()> {
        if self.status != ReversalStatus::Pending {
            return Err(AppError::Validation(format!(
                "cannot approve a reversal in state {:?}",
                self.status
            )));
        }
        self.status = ReversalStatus::Approved;
        self.reviewed_by = Some(reviewer_id);
        self.review_notes = notes;
        self.reviewed_at = Some(Utc::now());
        Ok(())
    }

    pub fn reject(&mut self, reviewer_id: Uuid, notes: Option<String>) -> Result<()> {
        if self.status != ReversalStatus::Pending {
            return Err(AppError::Validation(format!(
                "cannot reject a reversal in state {:?}",
                self.status
            )));
        }
        self.status = ReversalStatus::Rejected;
        self.reviewed_by = Some(reviewer_id);
        self.review_notes = notes;
        self.reviewed_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_processed(&mut self, compensating_transaction_id: Uuid) -> Result<()> {
        if self.status != ReversalStatus::Approved {
            return Err(AppError::Validation(format!(
                "cannot process a reversal in state {:?}",
                self.status
            )));
        }
        self.status = ReversalStatus::Processed;
        self.compensating_transaction_id = Some(compensating_transaction_id);
        self.processed_at = Some(Utc::now());
        Ok(())
    }
}
