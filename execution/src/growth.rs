//! Exponential multiplier growth.
//!
//! Each scheduler tick applies `m += m * dt * rate` using the wall-clock time
//! elapsed since the previous tick, so dropped or late ticks do not change the
//! shape of the curve. The value is tracked in micro-units and truncated to
//! hundredths for display. The sub-micro part of each step is carried into the
//! next one, so slow curves and short ticks still grow.

use crash_types::Multiplier;

/// `elapsed_ms * rate_milli` units per whole step (ms -> s and milli -> 1).
const STEP_SCALE: u128 = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthCurve {
    micros: u64,
    rate_milli: u32,
    /// Carried numerator, always below `STEP_SCALE`.
    remainder: u128,
}

impl GrowthCurve {
    pub fn new(start: Multiplier, rate_milli: u32) -> Self {
        Self {
            micros: start.to_micros(),
            rate_milli,
            remainder: 0,
        }
    }

    /// Advance the curve by `elapsed_ms` and return the displayed multiplier.
    pub fn advance(&mut self, elapsed_ms: u64) -> Multiplier {
        let numerator = (self.micros as u128)
            .saturating_mul(elapsed_ms as u128)
            .saturating_mul(self.rate_milli as u128)
            .saturating_add(self.remainder);
        self.remainder = numerator % STEP_SCALE;
        let increment = u64::try_from(numerator / STEP_SCALE).unwrap_or(u64::MAX);
        self.micros = self.micros.saturating_add(increment);
        self.displayed()
    }

    pub fn displayed(&self) -> Multiplier {
        Multiplier::from_micros_truncated(self.micros)
    }

    pub fn micros(&self) -> u64 {
        self.micros
    }
}
