use crate::collaborators::{KycProvider, UserRef};
use crate::config::ComplianceSettings;
use crate::error::{AppError, Result};
use crate::models::{Account, CaseSeverity, CaseType, ComplianceCase, Transaction};
use crate::observability::get_metrics;
use crate::repositories::{CaseRepository, TransactionRepository};
use chrono::{DateTime, Duration, Timelike, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// The AML gate. Runs before any ledger mutation; a rejection means the
/// orchestrator marks the transaction FAILED and never touches balances.
/// Flag-only findings open a compliance case without blocking.
pub struct ComplianceService {
    transactions: Arc<TransactionRepository>,
    cases: Arc<CaseRepository>,
    kyc: Arc<dyn KycProvider>,
    settings: ComplianceSettings,
}

impl ComplianceService {
    pub fn new(
        transactions: Arc<TransactionRepository>,
        cases: Arc<CaseRepository>,
        kyc: Arc<dyn KycProvider>,
        settings: ComplianceSettings,
    ) -> Self {
        Self {
            transactions,
            cases,
            kyc,
            settings,
        }
    }

    fn is_round_hundred(amount: Decimal) -> bool {
        amount % Decimal::from(100) == Decimal::ZERO
    }

    /// Checks the (already persisted, still pending) transaction. `at` is the
    /// evaluation time, passed in so the time-of-day check is deterministic.
    pub async fn check(
        &self,
        user: &UserRef,
        account: &Account,
        transaction: &Transaction,
        at: DateTime<Utc>,
    ) -> Result<()> {
        // KYC is a hard gate: unverified senders cannot move money.
        if !self.kyc.is_verified(user.id).await {
            self.cases
                .create(
                    ComplianceCase::new(
                        user.id,
                        CaseType::MoneyLaundering,
                        CaseSeverity::High,
                        format!(
                            "transaction {} attempted by unverified user",
                            transaction.transaction_number
                        ),
                    )
                    .with_transaction(transaction.id),
                )
                .await;
            get_metrics().record_compliance_rejection("kyc");
            return Err(AppError::ComplianceRejected(
                "sender is not KYC-verified".to_string(),
            ));
        }

        // At or above the reporting threshold: record the event, do not block.
        if transaction.amount >= self.settings.ctr_threshold {
            get_metrics().record_ctr_event(&transaction.currency);
            info!(
                transaction = %transaction.transaction_number,
                amount = %transaction.amount,
                "transaction at or above reporting threshold, CTR event recorded"
            );
        }

        // Structuring: several sub-threshold transactions whose combined
        // total crosses the reporting threshold inside the window.
        let window_start = at - Duration::hours(self.settings.structuring_window_hours);
        let prior: Vec<Transaction> = self
            .transactions
            .initiated_since(account.id, window_start)
            .await
            .into_iter()
            .filter(|t| t.id != transaction.id)
            .collect();

        if prior.len() >= self.settings.structuring_min_prior
            && transaction.amount < self.settings.ctr_threshold
        {
            let combined: Decimal =
                prior.iter().map(|t| t.amount).sum::<Decimal>() + transaction.amount;
            if combined >= self.settings.ctr_threshold {
                warn!(
                    transaction = %transaction.transaction_number,
                    combined = %combined,
                    "structuring detected"
                );
                self.cases
                    .create(
                        ComplianceCase::new(
                            user.id,
                            CaseType::Structuring,
                            CaseSeverity::High,
                            format!(
                                "{} transactions totalling {} in {}h, each under the {} reporting threshold",
                                prior.len() + 1,
                                combined,
                                self.settings.structuring_window_hours,
                                self.settings.ctr_threshold
                            ),
                        )
                        .with_transaction(transaction.id),
                    )
                    .await;
                get_metrics().record_compliance_rejection("structuring");
                return Err(AppError::ComplianceRejected(format!(
                    "combined {}h total {} reaches the reporting threshold",
                    self.settings.structuring_window_hours, combined
                )));
            }
        }

        // Unusual patterns are flag-only.
        self.flag_unusual_patterns(user, account, transaction, at).await;

        Ok(())
    }

    async fn flag_unusual_patterns(
        &self,
        user: &UserRef,
        account: &Account,
        transaction: &Transaction,
        at: DateTime<Utc>,
    ) {
        let local_hour = (at + Duration::hours(self.settings.local_utc_offset_hours)).hour();
        if local_hour >= self.settings.unusual_hour_start
            && local_hour < self.settings.unusual_hour_end
        {
            self.cases
                .create(
                    ComplianceCase::new(
                        user.id,
                        CaseType::UnusualPattern,
                        CaseSeverity::Low,
                        format!("transaction at {:02}:00 local time", local_hour),
                    )
                    .with_transaction(transaction.id),
                )
                .await;
        }

        let window_start = at - Duration::days(self.settings.round_amount_window_days);
        let round_count = self
            .transactions
            .initiated_since(account.id, window_start)
            .await
            .iter()
            .filter(|t| t.amount >= self.settings.round_amount_min && Self::is_round_hundred(t.amount))
            .count();
        if round_count >= self.settings.round_amount_count {
            self.cases
                .create(
                    ComplianceCase::new(
                        user.id,
                        CaseType::UnusualPattern,
                        CaseSeverity::Medium,
                        format!(
                            "{} round-hundred transactions of {} or more in {} days",
                            round_count,
                            self.settings.round_amount_min,
                            self.settings.round_amount_window_days
                        ),
                    )
                    .with_transaction(transaction.id),
                )
                .await;
        }
    }
}
