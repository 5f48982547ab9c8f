pub mod account;
pub mod account_balance;
pub mod compliance;
pub mod limits;
pub mod reversal;
pub mod risk;
pub mod transaction;

pub use account::{Account, AccountStatus};
pub use account_balance::AccountBalance;
pub use compliance::{CaseSeverity, CaseStatus, CaseType, ComplianceCase};
pub use limits::{AccountLimit, LimitType, UserRole};
pub use reversal::{ReversalStatus, ReversalType, TransactionReversal};
pub use risk::{FraudCheck, FraudRule, RiskAssessment, RiskLevel, RuleAction};
pub use transaction::{Transaction, TransactionStateMachine, TransactionStatus, TransactionType};
