pub mod account_repository;
pub mod balance_repository;
pub mod case_repository;
pub mod limit_repository;
pub mod reversal_repository;
pub mod rule_repository;
pub mod transaction_repository;

pub use account_repository::AccountRepository;
pub use balance_repository::BalanceRepository;
pub use case_repository::CaseRepository;
pub use limit_repository::LimitRepository;
pub use reversal_repository::ReversalRepository;
pub use rule_repository::RuleRepository;
pub use transaction_repository::TransactionRepository;
