use rust_decimal::Decimal;
use serde::Deserialize;

/// Engine configuration. Every threshold the engine consults lives here so
/// tests can inject alternates; nothing is a module-level constant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub fees: FeeSettings,
    pub risk: RiskSettings,
    pub compliance: ComplianceSettings,
    pub limits: LimitWindowSettings,
    pub ledger: LedgerSettings,
    pub reversal: ReversalSettings,
    pub numbering: NumberingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub log_level: String,
    pub log_format: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

/// Tiered fee schedule: `fee = clamp(amount * rate, min_fee, max_fee)`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeeSettings {
    pub rate: Decimal,
    pub min_fee: Decimal,
    pub max_fee: Decimal,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            rate: Decimal::new(29, 3),     // 2.9%
            min_fee: Decimal::new(30, 2),  // 0.30
            max_fee: Decimal::new(299, 2), // 2.99
        }
    }
}

/// Risk-scoring weights, profile thresholds and score bands.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    pub amount_threshold_weight: u32,
    pub velocity_weight: u32,
    pub structuring_weight: u32,
    pub new_account_weight: u32,
    pub high_frequency_weight: u32,
    /// Accounts younger than this many days are considered new.
    pub new_account_age_days: i64,
    /// More than this many transactions in the trailing 24h is high frequency.
    pub high_frequency_count: usize,
    /// Lower bound of the structuring band as a fraction of the reporting
    /// threshold (amount in [fraction * threshold, threshold) matches).
    pub structuring_band_fraction: Decimal,
    pub critical_score: u32,
    pub high_score: u32,
    pub medium_score: u32,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            amount_threshold_weight: 15,
            velocity_weight: 20,
            structuring_weight: 25,
            new_account_weight: 10,
            high_frequency_weight: 15,
            new_account_age_days: 7,
            high_frequency_count: 50,
            structuring_band_fraction: Decimal::new(9, 1),
            critical_score: 70,
            high_score: 50,
            medium_score: 30,
        }
    }
}

/// AML gate thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ComplianceSettings {
    /// Currency-transaction-report threshold.
    pub ctr_threshold: Decimal,
    /// Minimum number of prior transactions in the structuring window.
    pub structuring_min_prior: usize,
    pub structuring_window_hours: i64,
    /// Unusual-hour window [start, end) in local time.
    pub unusual_hour_start: u32,
    pub unusual_hour_end: u32,
    /// Offset applied to UTC when evaluating the unusual-hour window, so the
    /// check stays deterministic regardless of host timezone.
    pub local_utc_offset_hours: i64,
    /// Round-hundred pattern: this many transactions at or above
    /// `round_amount_min` in the trailing window flags the sender.
    pub round_amount_count: usize,
    pub round_amount_min: Decimal,
    pub round_amount_window_days: i64,
}

impl Default for ComplianceSettings {
    fn default() -> Self {
        Self {
            ctr_threshold: Decimal::from(10_000),
            structuring_min_prior: 3,
            structuring_window_hours: 24,
            unusual_hour_start: 2,
            unusual_hour_end: 5,
            local_utc_offset_hours: 0,
            round_amount_count: 5,
            round_amount_min: Decimal::from(1_000),
            round_amount_window_days: 7,
        }
    }
}

/// Rolling windows used by the limit enforcer. One convention for every
/// ceiling: trailing durations, not calendar periods.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitWindowSettings {
    pub daily_window_hours: i64,
    pub weekly_window_days: i64,
    pub monthly_window_days: i64,
}

impl Default for LimitWindowSettings {
    fn default() -> Self {
        Self {
            daily_window_hours: 24,
            weekly_window_days: 7,
            monthly_window_days: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Upper bound on waiting for an account's balance lock before the
    /// operation fails with a concurrency conflict.
    pub lock_timeout_ms: u64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReversalSettings {
    /// Transactions older than this many days are no longer reversible.
    pub eligibility_days: i64,
}

impl Default for ReversalSettings {
    fn default() -> Self {
        Self {
            eligibility_days: 90,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NumberingSettings {
    pub prefix: String,
}

impl Default for NumberingSettings {
    fn default() -> Self {
        Self {
            prefix: "TXN".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from `config/default`, an optional `config/local`
    /// override file, and `APP__`-prefixed environment variables.
    pub fn new() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        builder.build()?.try_deserialize()
    }
}
