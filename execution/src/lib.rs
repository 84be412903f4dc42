//! Crash round execution.
//!
//! This crate contains the single-player crash round engine: crash-point
//! generation, multiplier growth, settlement, the account ledger and the timer
//! queue that drives phase transitions.
//!
//! ## Determinism requirements
//! - Do not read wall-clock time inside the engine; the host passes `now_ms`.
//! - Randomness only enters through a [`CrashSource`].
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! The primary entrypoint is [`CrashEngine`].
//!
//! ## Minimal round (example)
//! ```rust
//! use crash_execution::{CrashEngine, EngineConfig, Ledger};
//! use crash_types::{Amount, Multiplier, Phase};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut engine = CrashEngine::with_rng(
//!     EngineConfig::default(),
//!     Ledger::default(),
//!     ChaCha20Rng::seed_from_u64(7),
//!     0,
//! )
//! .unwrap();
//! engine
//!     .place_bet(Amount::from_whole(10), Some(Multiplier::from_hundredths(150)))
//!     .unwrap();
//!
//! while engine.phase() != Phase::Crashed {
//!     let deadline = engine.next_deadline().unwrap();
//!     for event in engine.advance(deadline) {
//!         println!("{event:?}");
//!     }
//! }
//! ```

pub mod config;
pub mod crash_point;
pub mod engine;
pub mod growth;
pub mod ledger;
pub mod round_scheduler;
pub mod settlement;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

#[cfg(test)]
mod integration_tests;

pub use config::EngineConfig;
pub use crash_point::{
    CrashBand, CrashDraw, CrashPointGenerator, CrashProfile, CrashSource, JackpotConfig,
    RandomCrashSource,
};
pub use engine::{CrashEngine, EngineEvent, RoundState};
pub use growth::GrowthCurve;
pub use ledger::Ledger;
pub use round_scheduler::{Fired, Scheduler, Timer, TimerHandle, TimerQueue};
pub use settlement::{settle, Settlement};
