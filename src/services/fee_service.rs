use crate::config::FeeSettings;
use rust_decimal::{Decimal, RoundingStrategy};

/// Pure fee calculator: `fee = clamp(amount * rate, min_fee, max_fee)`,
/// rounded to cents. The schedule is injected so tests (and product) can
/// swap rates without touching the engine.
#[derive(Debug, Clone)]
pub struct FeeCalculator {
    schedule: FeeSettings,
}

impl FeeCalculator {
    pub fn new(schedule: FeeSettings) -> Self {
        Self { schedule }
    }

    pub fn fee(&self, amount: Decimal) -> Decimal {
        let raw = amount * self.schedule.rate;
        raw.clamp(self.schedule.min_fee, self.schedule.max_fee)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn schedule(&self) -> &FeeSettings {
        &self.schedule
    }
}
