//! Deterministic sources and drivers for tests.

use std::collections::VecDeque;

use crash_types::{CrashTier, Multiplier};

use crate::config::EngineConfig;
use crate::crash_point::{CrashDraw, CrashSource};
use crate::engine::CrashEngine;
use crate::ledger::Ledger;

/// Growth rate used by scripted draws (1.2/s).
pub const SCRIPTED_RATE_MILLI: u32 = 1_200;

/// Upper bound on polls in [`advance_until`] before giving up.
const MAX_POLLS: usize = 1_000_000;

/// Replays a fixed script of draws, cycling when it runs out.
#[derive(Clone, Debug)]
pub struct FixedCrashSource {
    script: VecDeque<CrashDraw>,
}

impl FixedCrashSource {
    /// Script of crash points in hundredths, all on the default curve.
    pub fn new(crash_points: impl IntoIterator<Item = u32>) -> Self {
        Self::from_draws(crash_points.into_iter().map(crash_at))
    }

    pub fn from_draws(draws: impl IntoIterator<Item = CrashDraw>) -> Self {
        let script: VecDeque<_> = draws.into_iter().collect();
        assert!(!script.is_empty(), "crash script must not be empty");
        Self { script }
    }
}

impl CrashSource for FixedCrashSource {
    fn next_draw(&mut self) -> CrashDraw {
        let draw = self.script.pop_front().unwrap_or_else(|| crash_at(100));
        self.script.push_back(draw);
        draw
    }
}

/// A mid-tier draw crashing at `hundredths`.
pub fn crash_at(hundredths: u32) -> CrashDraw {
    CrashDraw {
        crash_point: Multiplier::from_hundredths(hundredths),
        growth_rate_milli: SCRIPTED_RATE_MILLI,
        tier: CrashTier::Mid,
    }
}

/// Default-config engine at `t = 0` with the default ledger.
pub fn fixed_engine(
    crash_points: impl IntoIterator<Item = u32>,
) -> CrashEngine<FixedCrashSource> {
    CrashEngine::new(
        EngineConfig::default(),
        Ledger::default(),
        FixedCrashSource::new(crash_points),
        0,
    )
    .expect("default config is valid")
}

/// Poll the engine every `step_ms` until `done` holds. Returns the last poll time.
pub fn advance_until<S, F>(engine: &mut CrashEngine<S>, step_ms: u64, mut done: F) -> u64
where
    S: CrashSource,
    F: FnMut(&CrashEngine<S>) -> bool,
{
    for _ in 0..MAX_POLLS {
        if done(engine) {
            return engine.now_ms();
        }
        let now = engine.now_ms() + step_ms;
        engine.advance(now);
    }
    panic!("condition not reached after {MAX_POLLS} polls");
}
