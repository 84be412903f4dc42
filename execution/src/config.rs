use crash_types::{ConfigError, Multiplier, DEFAULT_HISTORY_LEN};
use serde::{Deserialize, Serialize};

use crate::crash_point::CrashProfile;

/// Engine timing and distribution settings.
///
/// Every field has a default, so a config file only needs to name what it
/// overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Multiplier every running phase starts from.
    pub start_multiplier: Multiplier,
    /// Growth tick interval.
    pub tick_ms: u64,
    /// Countdown steps in each betting phase.
    pub countdown_ticks: u32,
    /// Time between countdown steps.
    pub countdown_interval_ms: u64,
    /// Pause between the crash and the next betting phase.
    pub crash_reset_delay_ms: u64,
    /// Results kept in the history strip.
    pub history_len: usize,
    pub profile: CrashProfile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_multiplier: Multiplier::from_hundredths(50),
            tick_ms: 30,
            countdown_ticks: 3,
            countdown_interval_ms: 500,
            crash_reset_delay_ms: 1_000,
            history_len: DEFAULT_HISTORY_LEN,
            profile: CrashProfile::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_multiplier == Multiplier::ZERO {
            return Err(ConfigError::Zero("start_multiplier"));
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::Zero("tick_ms"));
        }
        if self.countdown_ticks == 0 {
            return Err(ConfigError::Zero("countdown_ticks"));
        }
        if self.countdown_interval_ms == 0 {
            return Err(ConfigError::Zero("countdown_interval_ms"));
        }
        if self.crash_reset_delay_ms == 0 {
            return Err(ConfigError::Zero("crash_reset_delay_ms"));
        }
        if self.history_len == 0 {
            return Err(ConfigError::Zero("history_len"));
        }
        self.profile.validate()?;
        // The multiplier only rises while running, so no draw may sit below the start.
        if let Some(floor) = self.profile.lowest_crash_point() {
            if self.start_multiplier > floor {
                return Err(ConfigError::StartAboveCrashFloor {
                    start: self.start_multiplier,
                    floor,
                });
            }
        }
        Ok(())
    }

    /// Length of one betting phase in milliseconds.
    pub fn betting_duration_ms(&self) -> u64 {
        self.countdown_interval_ms
            .saturating_mul(self.countdown_ticks as u64)
    }
}
