use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Application-wide error type. Every failure on the money-moving path is one
/// of these variants and is surfaced to the caller, never swallowed.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    #[error("account '{0}' is not active")]
    AccountNotActive(Uuid),

    #[error("transaction limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("compliance check rejected transaction: {0}")]
    ComplianceRejected(String),

    #[error("transaction blocked by fraud controls: {0}")]
    FraudBlocked(String),

    #[error("reversal not eligible: {0}")]
    ReversalIneligible(String),

    #[error("invalid reversal amount: {0}")]
    ReversalAmountInvalid(String),

    #[error("concurrent update conflict on account '{0}'")]
    ConcurrencyConflict(Uuid),

    #[error("{0} not found")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Short machine-readable label used for metrics and failure reasons.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InsufficientFunds { .. } => "insufficient_funds",
            AppError::AccountNotActive(_) => "account_not_active",
            AppError::LimitExceeded(_) => "limit_exceeded",
            AppError::ComplianceRejected(_) => "compliance_rejected",
            AppError::FraudBlocked(_) => "fraud_blocked",
            AppError::ReversalIneligible(_) => "reversal_ineligible",
            AppError::ReversalAmountInvalid(_) => "reversal_amount_invalid",
            AppError::ConcurrencyConflict(_) => "concurrency_conflict",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err = AppError::InsufficientFunds {
            requested: dec!(100),
            available: dec!(40),
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds: requested 100, available 40"
        );
    }

    #[test]
    fn test_error_kind_labels() {
        assert_eq!(
            AppError::LimitExceeded("daily".to_string()).kind(),
            "limit_exceeded"
        );
        assert_eq!(
            AppError::NotFound("account".to_string()).kind(),
            "not_found"
        );
    }
}
