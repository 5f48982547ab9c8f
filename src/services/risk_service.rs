use crate::config::RiskSettings;
use crate::error::Result;
use crate::models::{
    Account, CaseSeverity, CaseType, ComplianceCase, FraudCheck, RiskAssessment, RiskLevel,
    RuleAction, Transaction,
};
use crate::observability::get_metrics;
use crate::repositories::{CaseRepository, RuleRepository, TransactionRepository};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// A fraud rule that matched during evaluation, with the action it demands.
#[derive(Debug, Clone)]
pub struct TriggeredRule {
    pub rule_id: Uuid,
    pub name: String,
    pub action: RuleAction,
}

/// Outcome of one risk evaluation: the immutable assessment plus every rule
/// that matched. The orchestrator decides what the actions mean for the
/// transaction.
#[derive(Debug, Clone)]
pub struct RiskOutcome {
    pub assessment: RiskAssessment,
    pub triggered: Vec<TriggeredRule>,
}

impl RiskOutcome {
    /// Reason this evaluation must fail the transaction, if any: a CRITICAL
    /// score or a matched BLOCK rule.
    pub fn hard_block_reason(&self) -> Option<String> {
        if self.assessment.level == RiskLevel::Critical {
            return Some(format!(
                "risk score {} is critical",
                self.assessment.score
            ));
        }
        self.triggered
            .iter()
            .find(|t| t.action == RuleAction::Block)
            .map(|t| format!("fraud rule '{}' blocked the transaction", t.name))
    }

    /// First matched rule demanding an account freeze, if any.
    pub fn freeze_demand(&self) -> Option<&TriggeredRule> {
        self.triggered
            .iter()
            .find(|t| t.action == RuleAction::FreezeAccount)
    }
}

/// The risk scorer: a fixed pipeline of independent checks, each adding a
/// configured weight and a human-readable factor, summed into a score that is
/// banded into a level. Deterministic for a given rule set and history.
pub struct RiskService {
    rules: Arc<RuleRepository>,
    transactions: Arc<TransactionRepository>,
    cases: Arc<CaseRepository>,
    settings: RiskSettings,
}

impl RiskService {
    pub fn new(
        rules: Arc<RuleRepository>,
        transactions: Arc<TransactionRepository>,
        cases: Arc<CaseRepository>,
        settings: RiskSettings,
    ) -> Self {
        Self {
            rules,
            transactions,
            cases,
            settings,
        }
    }

    fn level_for(&self, score: u32) -> RiskLevel {
        if score >= self.settings.critical_score {
            RiskLevel::Critical
        } else if score >= self.settings.high_score {
            RiskLevel::High
        } else if score >= self.settings.medium_score {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    fn case_severity(level: RiskLevel) -> CaseSeverity {
        match level {
            RiskLevel::Critical => CaseSeverity::Critical,
            RiskLevel::High => CaseSeverity::High,
            RiskLevel::Medium => CaseSeverity::Medium,
            RiskLevel::Low => CaseSeverity::Low,
        }
    }

    /// Evaluates the (already persisted, still pending) transaction. The
    /// transaction itself is excluded from the history windows it is judged
    /// against.
    pub async fn evaluate(
        &self,
        account: &Account,
        user_id: Uuid,
        transaction: &Transaction,
    ) -> Result<RiskOutcome> {
        let now = Utc::now();
        let mut score = 0u32;
        let mut factors = Vec::new();
        let mut triggered = Vec::new();

        for rule in self.rules.active_rules().await {
            let matched = match rule.check {
                FraudCheck::AmountThreshold { threshold } => {
                    if transaction.amount > threshold {
                        score += self.settings.amount_threshold_weight;
                        factors.push(format!(
                            "amount {} exceeds threshold {} ({})",
                            transaction.amount, threshold, rule.name
                        ));
                        true
                    } else {
                        false
                    }
                }
                FraudCheck::VelocityCheck {
                    max_count,
                    window_hours,
                } => {
                    let since = now - Duration::hours(window_hours);
                    let count = self
                        .transactions
                        .initiated_since(account.id, since)
                        .await
                        .iter()
                        .filter(|t| t.id != transaction.id)
                        .count();
                    if count as u32 >= max_count {
                        score += self.settings.velocity_weight;
                        factors.push(format!(
                            "{} transactions in the last {}h ({})",
                            count, window_hours, rule.name
                        ));
                        true
                    } else {
                        false
                    }
                }
                FraudCheck::StructuringDetection {
                    reporting_threshold,
                } => {
                    let band_floor = reporting_threshold * self.settings.structuring_band_fraction;
                    if transaction.amount >= band_floor
                        && transaction.amount < reporting_threshold
                    {
                        score += self.settings.structuring_weight;
                        factors.push(format!(
                            "amount {} is just under reporting threshold {} ({})",
                            transaction.amount, reporting_threshold, rule.name
                        ));
                        true
                    } else {
                        false
                    }
                }
            };

            if matched {
                triggered.push(TriggeredRule {
                    rule_id: rule.id,
                    name: rule.name.clone(),
                    action: rule.action,
                });
            }
        }

        let age_days = account.age_days(now);
        if age_days < self.settings.new_account_age_days {
            score += self.settings.new_account_weight;
            factors.push(format!("account is only {} days old", age_days));
        }

        let day_ago = now - Duration::hours(24);
        let daily_count = self
            .transactions
            .initiated_since(account.id, day_ago)
            .await
            .iter()
            .filter(|t| t.id != transaction.id)
            .count();
        if daily_count > self.settings.high_frequency_count {
            score += self.settings.high_frequency_weight;
            factors.push(format!("{} transactions in the last 24h", daily_count));
        }

        let level = self.level_for(score);
        let assessment = RiskAssessment::new(
            account.id,
            Some(transaction.id),
            score,
            level,
            factors,
        );

        if level >= RiskLevel::High {
            get_metrics().record_risk_flag(&format!("{:?}", level));
            warn!(
                transaction = %transaction.transaction_number,
                score,
                ?level,
                "risk evaluation flagged transaction"
            );
            self.cases
                .create(
                    ComplianceCase::new(
                        user_id,
                        CaseType::HighRiskScore,
                        Self::case_severity(level),
                        assessment.factors.join("; "),
                    )
                    .with_transaction(transaction.id),
                )
                .await;
        }

        Ok(RiskOutcome {
            assessment,
            triggered,
        })
    }
}
