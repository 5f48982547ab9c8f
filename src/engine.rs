use crate::collaborators::{InMemoryDirectory, KycProvider, UserDirectory};
use crate::config::Settings;
use crate::events::{LoggingSink, NotificationSink, RewardsSink, SideEffectDispatcher};
use crate::repositories::{
    AccountRepository, BalanceRepository, CaseRepository, LimitRepository, ReversalRepository,
    RuleRepository, TransactionRepository,
};
use crate::services::{
    AccountService, ComplianceService, FeeCalculator, LedgerService, LimitService,
    ReversalService, RiskService, TransactionNumberGenerator, TransactionService,
};
use std::sync::Arc;

/// The out-of-scope collaborators the engine consumes, bundled for wiring.
#[derive(Clone)]
pub struct Collaborators {
    pub directory: Arc<dyn UserDirectory>,
    pub kyc: Arc<dyn KycProvider>,
    pub notifications: Arc<dyn NotificationSink>,
    pub rewards: Arc<dyn RewardsSink>,
}

impl Collaborators {
    /// Fully in-memory collaborators for the demo binary and tests. Returns
    /// the directory as well so callers can seed users.
    pub fn in_memory() -> (Self, Arc<InMemoryDirectory>) {
        let directory = Arc::new(InMemoryDirectory::new());
        let sink = Arc::new(LoggingSink);
        let collaborators = Self {
            directory: directory.clone() as Arc<dyn UserDirectory>,
            kyc: directory.clone() as Arc<dyn KycProvider>,
            notifications: sink.clone() as Arc<dyn NotificationSink>,
            rewards: sink as Arc<dyn RewardsSink>,
        };
        (collaborators, directory)
    }
}

/// Composition root: builds the repositories and services from `Settings`
/// and the collaborator bundle. Must be constructed inside a tokio runtime
/// (the side-effect dispatcher spawns its worker task).
#[derive(Clone)]
pub struct WalletEngine {
    pub accounts: Arc<AccountRepository>,
    pub balances: Arc<BalanceRepository>,
    pub transactions: Arc<TransactionRepository>,
    pub rules: Arc<RuleRepository>,
    pub limits: Arc<LimitRepository>,
    pub cases: Arc<CaseRepository>,
    pub reversals: Arc<ReversalRepository>,

    pub account_service: Arc<AccountService>,
    pub ledger: Arc<LedgerService>,
    pub transaction_service: Arc<TransactionService>,
    pub reversal_service: Arc<ReversalService>,
}

impl WalletEngine {
    pub fn new(settings: Settings, collaborators: Collaborators) -> Self {
        let accounts = Arc::new(AccountRepository::new());
        let balances = Arc::new(BalanceRepository::new());
        let transactions = Arc::new(TransactionRepository::new());
        let rules = Arc::new(RuleRepository::new());
        let limits = Arc::new(LimitRepository::new());
        let cases = Arc::new(CaseRepository::new());
        let reversals = Arc::new(ReversalRepository::new());

        let dispatcher =
            SideEffectDispatcher::spawn(collaborators.notifications, collaborators.rewards);

        let account_service = Arc::new(AccountService::new(accounts.clone(), balances.clone()));
        let ledger = Arc::new(LedgerService::new(
            accounts.clone(),
            balances.clone(),
            &settings.ledger,
        ));
        let risk = Arc::new(RiskService::new(
            rules.clone(),
            transactions.clone(),
            cases.clone(),
            settings.risk.clone(),
        ));
        let compliance = Arc::new(ComplianceService::new(
            transactions.clone(),
            cases.clone(),
            collaborators.kyc,
            settings.compliance.clone(),
        ));
        let limit_service = Arc::new(LimitService::new(
            limits.clone(),
            transactions.clone(),
            settings.limits.clone(),
        ));
        let numbering = TransactionNumberGenerator::new(&settings.numbering);

        let transaction_service = Arc::new(TransactionService::new(
            collaborators.directory,
            accounts.clone(),
            transactions.clone(),
            ledger.clone(),
            FeeCalculator::new(settings.fees.clone()),
            risk,
            compliance,
            limit_service,
            numbering.clone(),
            dispatcher.clone(),
        ));

        let reversal_service = Arc::new(ReversalService::new(
            transactions.clone(),
            reversals.clone(),
            ledger.clone(),
            numbering,
            dispatcher,
            &settings.reversal,
        ));

        Self {
            accounts,
            balances,
            transactions,
            rules,
            limits,
            cases,
            reversals,
            account_service,
            ledger,
            transaction_service,
            reversal_service,
        }
    }
}
