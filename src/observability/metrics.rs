use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Global metrics instance.
pub static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Metrics collector for the wallet engine.
#[derive(Debug, Clone, Default)]
pub struct Metrics;

impl Metrics {
    pub fn new() -> Self {
        Self
    }

    pub fn record_transaction_created(&self, transaction_type: &str, currency: &str) {
        counter!("wallet_transactions_total", "type" => transaction_type.to_string(), "currency" => currency.to_string()).increment(1);
    }

    pub fn record_transaction_completed(&self, transaction_type: &str, currency: &str) {
        counter!("wallet_transactions_completed_total", "type" => transaction_type.to_string(), "currency" => currency.to_string()).increment(1);
    }

    pub fn record_transaction_failed(&self, transaction_type: &str, reason: &str) {
        counter!("wallet_transactions_failed_total", "type" => transaction_type.to_string(), "reason" => reason.to_string()).increment(1);
    }

    pub fn record_transaction_reversed(&self, reversal_type: &str) {
        counter!("wallet_transactions_reversed_total", "type" => reversal_type.to_string()).increment(1);
    }

    pub fn record_risk_flag(&self, level: &str) {
        counter!("wallet_risk_flags_total", "level" => level.to_string()).increment(1);
    }

    pub fn record_compliance_rejection(&self, reason: &str) {
        counter!("wallet_compliance_rejections_total", "reason" => reason.to_string()).increment(1);
    }

    pub fn record_ctr_event(&self, currency: &str) {
        counter!("wallet_ctr_events_total", "currency" => currency.to_string()).increment(1);
    }

    pub fn record_limit_denied(&self, role: &str) {
        counter!("wallet_limit_denials_total", "role" => role.to_string()).increment(1);
    }

    pub fn record_ledger_latency(&self, duration_ms: f64) {
        histogram!("wallet_ledger_write_duration_ms").record(duration_ms);
    }

    pub fn record_lock_conflict(&self) {
        counter!("wallet_ledger_lock_conflicts_total").increment(1);
    }
}

/// Timer for measuring operation latency.
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for LatencyTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Initializes the metrics system and returns the Prometheus handle.
pub fn init_metrics() -> PrometheusHandle {
    let handle = METRICS_HANDLE.get_or_init(|| {
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .expect("Failed to install Prometheus recorder");

        describe_metrics();
        handle
    });

    METRICS.get_or_init(Metrics::new);

    handle.clone()
}

fn describe_metrics() {
    describe_counter!(
        "wallet_transactions_total",
        Unit::Count,
        "Total number of transactions created"
    );
    describe_counter!(
        "wallet_transactions_completed_total",
        Unit::Count,
        "Total number of transactions completed"
    );
    describe_counter!(
        "wallet_transactions_failed_total",
        Unit::Count,
        "Total number of failed transactions"
    );
    describe_counter!(
        "wallet_transactions_reversed_total",
        Unit::Count,
        "Total number of processed reversals"
    );
    describe_counter!(
        "wallet_risk_flags_total",
        Unit::Count,
        "Total number of high or critical risk evaluations"
    );
    describe_counter!(
        "wallet_compliance_rejections_total",
        Unit::Count,
        "Total number of transactions rejected by the compliance gate"
    );
    describe_counter!(
        "wallet_ctr_events_total",
        Unit::Count,
        "Total number of transactions at or above the reporting threshold"
    );
    describe_counter!(
        "wallet_limit_denials_total",
        Unit::Count,
        "Total number of transactions denied by account limits"
    );
    describe_counter!(
        "wallet_ledger_lock_conflicts_total",
        Unit::Count,
        "Total number of ledger operations that timed out waiting for a balance lock"
    );
    describe_histogram!(
        "wallet_ledger_write_duration_ms",
        Unit::Milliseconds,
        "Ledger write latency in milliseconds"
    );
}

/// Returns the global metrics instance.
pub fn get_metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}
