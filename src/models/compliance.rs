use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a case was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseType {
    MoneyLaundering,
    Structuring,
    UnusualPattern,
    HighRiskScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Review state. The engine only ever creates PENDING cases; the other
/// states are reached through the human-review hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Pending,
    Reviewed,
    Dismissed,
    Referred,
}

/// A suspicious-activity / compliance case raised by the risk scorer or the
/// AML gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceCase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub transaction_id: Option<Uuid>,
    pub case_type: CaseType,
    pub severity: CaseSeverity,
    pub status: CaseStatus,
    /// True for cases the engine opened on its own.
    pub auto_detected: bool,
    pub description: String,
    pub reviewer_id: Option<Uuid>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl ComplianceCase {
    pub fn new(
        user_id: Uuid,
        case_type: CaseType,
        severity: CaseSeverity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            transaction_id: None,
            case_type,
            severity,
            status: CaseStatus::Pending,
            auto_detected: true,
            description: description.into(),
            reviewer_id: None,
            review_notes: None,
            created_at: Utc::now(),
            reviewed_at: None,
        }
    }

    pub fn with_transaction(mut self, transaction_id: Uuid) -> Self {
        self.transaction_id = Some(transaction_id);
        self
    }

    /// Human-review hook: records the reviewer's verdict. The engine never
    /// calls this itself.
    pub fn review(&mut self, reviewer_id: Uuid, status: CaseStatus, notes: Option<String>) {
        self.status = status;
        self.reviewer_id = Some(reviewer_id);
        self.review_notes = notes;
        self.reviewed_at = Some(Utc::now());
    }
}
