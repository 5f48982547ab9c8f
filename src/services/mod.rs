pub mod account_service;
pub mod compliance_service;
pub mod fee_service;
pub mod ledger_service;
pub mod limit_service;
pub mod numbering;
pub mod reversal_service;
pub mod risk_service;
pub mod transaction_service;

pub use account_service::{AccountService, CreateAccountRequest};
pub use compliance_service::ComplianceService;
pub use fee_service::FeeCalculator;
pub use ledger_service::LedgerService;
pub use limit_service::LimitService;
pub use numbering::TransactionNumberGenerator;
pub use reversal_service::ReversalService;
pub use risk_service::{RiskOutcome, RiskService, TriggeredRule};
pub use transaction_service::TransactionService;
