use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Transaction, TransactionStatus, TransactionType};

/// Type of wallet event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    TransactionCompleted,
    TransactionFailed,
    TransactionReversed,
}

/// Envelope wrapping all events with common metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    pub event_id: Uuid,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub payload: T,
}

impl<T> EventEnvelope<T> {
    pub fn new(event_type: EventType, payload: T) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            timestamp: Utc::now(),
            source: "wallet-engine".to_string(),
            payload,
        }
    }
}

/// Event payload describing a transaction that reached a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionEvent {
    pub transaction_id: Uuid,
    pub transaction_number: String,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    /// User the side effects (notification, rewards) are addressed to.
    pub user_id: Uuid,
    pub sender_account_id: Option<Uuid>,
    pub receiver_account_id: Option<Uuid>,
    pub amount: Decimal,
    pub fee_amount: Decimal,
    pub currency: String,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TransactionEvent {
    pub fn from_transaction(transaction: &Transaction, user_id: Uuid) -> Self {
        Self {
            transaction_id: transaction.id,
            transaction_number: transaction.transaction_number.clone(),
            transaction_type: transaction.transaction_type,
            status: transaction.status,
            user_id,
            sender_account_id: transaction.sender_account_id,
            receiver_account_id: transaction.receiver_account_id,
            amount: transaction.amount,
            fee_amount: transaction.fee_amount,
            currency: transaction.currency.clone(),
            failure_reason: transaction.failure_reason.clone(),
            created_at: transaction.created_at,
            completed_at: transaction.completed_at,
        }
    }
}
