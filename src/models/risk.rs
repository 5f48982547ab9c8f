use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Banded risk level derived from a numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Result of one risk evaluation. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub id: Uuid,
    pub account_id: Uuid,
    pub transaction_id: Option<Uuid>,
    pub score: u32,
    pub level: RiskLevel,
    /// Human-readable contributing factors.
    pub factors: Vec<String>,
    pub assessed_at: DateTime<Utc>,
}

impl RiskAssessment {
    pub fn new(
        account_id: Uuid,
        transaction_id: Option<Uuid>,
        score: u32,
        level: RiskLevel,
        factors: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            transaction_id,
            score,
            level,
            factors,
            assessed_at: Utc::now(),
        }
    }
}

/// What a matched fraud rule does beyond contributing to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAction {
    /// Record only; case creation is driven by the resulting level.
    Flag,
    /// Force the transaction to fail.
    Block,
    /// Suspend the sender's account.
    FreezeAccount,
    /// Hand off to the KYC workflow (out of scope); treated as a flag here.
    RequireVerification,
}

/// The check a fraud rule performs, one variant per rule kind so dispatch is
/// an exhaustive match rather than a runtime default branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FraudCheck {
    /// Matches when the transaction amount exceeds the threshold.
    AmountThreshold { threshold: Decimal },
    /// Matches when the sender initiated at least `max_count` transactions in
    /// the trailing window.
    VelocityCheck { max_count: u32, window_hours: i64 },
    /// Matches amounts just under a reporting threshold.
    StructuringDetection { reporting_threshold: Decimal },
}

/// A configurable fraud rule evaluated by the risk scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudRule {
    pub id: Uuid,
    pub name: String,
    pub check: FraudCheck,
    pub action: RuleAction,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl FraudRule {
    pub fn new(name: impl Into<String>, check: FraudCheck, action: RuleAction) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            check,
            action,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn amount_threshold(
        name: impl Into<String>,
        threshold: Decimal,
        action: RuleAction,
    ) -> Self {
        Self::new(name, FraudCheck::AmountThreshold { threshold }, action)
    }

    pub fn velocity(
        name: impl Into<String>,
        max_count: u32,
        window_hours: i64,
        action: RuleAction,
    ) -> Self {
        Self::new(
            name,
            FraudCheck::VelocityCheck {
                max_count,
                window_hours,
            },
            action,
        )
    }

    pub fn structuring(
        name: impl Into<String>,
        reporting_threshold: Decimal,
        action: RuleAction,
    ) -> Self {
        Self::new(
            name,
            FraudCheck::StructuringDetection {
                reporting_threshold,
            },
            action,
        )
    }
}
