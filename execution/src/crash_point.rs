//! Crash-point generation.
//!
//! A round's crash point is drawn once, at round start, from a weighted
//! distribution of non-overlapping bands:
//!
//! | band | probability | crash point |
//! |------|-------------|-------------|
//! | low  | 80%         | [0.50, 1.00) |
//! | mid  | 15%         | [1.10, 5.00) |
//! | high | 5%          | [5.10, 200.00) |
//!
//! The low band can never be won (the curve starts below 1.00x and crashes
//! before reaching break-even), which gives the house its edge. Before the band
//! draw a rare jackpot roll may override the band with a gentler, mid-high
//! crash point.
//!
//! Generation is a pure function of the profile and an [`rand::Rng`], so a
//! seeded [`ChaCha20Rng`] reproduces the same sequence of rounds.

use crash_types::{ConfigError, CrashTier, Multiplier, BPS_SCALE};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// One probability band of the crash distribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashBand {
    pub tier: CrashTier,
    /// Probability of landing in this band, in basis points.
    pub probability_bps: u32,
    /// Inclusive lower bound.
    pub min: Multiplier,
    /// Exclusive upper bound.
    pub max: Multiplier,
    /// Growth rate used for rounds drawn from this band, in thousandths per second.
    pub growth_rate_milli: u32,
}

/// Rare override rolled before the band draw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JackpotConfig {
    /// Chance of a jackpot round in basis points (0 disables jackpots).
    pub chance_bps: u32,
    pub min: Multiplier,
    pub max: Multiplier,
    pub growth_rate_milli: u32,
}

impl Default for JackpotConfig {
    fn default() -> Self {
        Self {
            chance_bps: 10,
            min: Multiplier::from_hundredths(500),
            max: Multiplier::from_hundredths(1_000),
            growth_rate_milli: 800,
        }
    }
}

/// Full crash distribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashProfile {
    pub bands: Vec<CrashBand>,
    #[serde(default)]
    pub jackpot: JackpotConfig,
}

impl Default for CrashProfile {
    fn default() -> Self {
        Self {
            bands: vec![
                CrashBand {
                    tier: CrashTier::Low,
                    probability_bps: 8_000,
                    min: Multiplier::from_hundredths(50),
                    max: Multiplier::from_hundredths(100),
                    growth_rate_milli: 1_200,
                },
                CrashBand {
                    tier: CrashTier::Mid,
                    probability_bps: 1_500,
                    min: Multiplier::from_hundredths(110),
                    max: Multiplier::from_hundredths(500),
                    growth_rate_milli: 1_200,
                },
                CrashBand {
                    tier: CrashTier::High,
                    probability_bps: 500,
                    min: Multiplier::from_hundredths(510),
                    max: Multiplier::from_hundredths(20_000),
                    growth_rate_milli: 1_000,
                },
            ],
            jackpot: JackpotConfig::default(),
        }
    }
}

impl CrashProfile {
    /// Smallest crash point any draw can produce.
    pub fn lowest_crash_point(&self) -> Option<Multiplier> {
        let bands = self.bands.iter().map(|band| band.min);
        let jackpot = (self.jackpot.chance_bps > 0).then_some(self.jackpot.min);
        bands.chain(jackpot).min()
    }

    /// Check that the bands partition `[0, 1)` exactly and never overlap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let total: u32 = self
            .bands
            .iter()
            .fold(0u32, |acc, band| acc.saturating_add(band.probability_bps));
        if total != BPS_SCALE {
            return Err(ConfigError::ProbabilitySum(total));
        }

        for (index, band) in self.bands.iter().enumerate() {
            if band.min == Multiplier::ZERO || band.min >= band.max {
                return Err(ConfigError::InvalidRange { index });
            }
            if band.growth_rate_milli == 0 {
                return Err(ConfigError::Zero("growth_rate_milli"));
            }
        }

        let mut order: Vec<usize> = (0..self.bands.len()).collect();
        order.sort_by_key(|&index| self.bands[index].min);
        for pair in order.windows(2) {
            let (first, second) = (pair[0], pair[1]);
            if self.bands[first].max > self.bands[second].min {
                return Err(ConfigError::Overlap { first, second });
            }
        }

        let jackpot = &self.jackpot;
        if jackpot.chance_bps > BPS_SCALE {
            return Err(ConfigError::JackpotChance(jackpot.chance_bps));
        }
        if jackpot.chance_bps > 0 {
            if jackpot.min == Multiplier::ZERO || jackpot.min >= jackpot.max {
                return Err(ConfigError::InvalidRange {
                    index: self.bands.len(),
                });
            }
            if jackpot.growth_rate_milli == 0 {
                return Err(ConfigError::Zero("jackpot.growth_rate_milli"));
            }
        }
        Ok(())
    }
}

/// Result of one crash-point draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CrashDraw {
    pub crash_point: Multiplier,
    pub growth_rate_milli: u32,
    pub tier: CrashTier,
}

/// Draws crash points from a validated [`CrashProfile`].
#[derive(Clone, Debug)]
pub struct CrashPointGenerator {
    profile: CrashProfile,
}

impl CrashPointGenerator {
    pub fn new(profile: CrashProfile) -> Result<Self, ConfigError> {
        profile.validate()?;
        Ok(Self { profile })
    }

    pub fn profile(&self) -> &CrashProfile {
        &self.profile
    }

    /// Draw the crash point for a new round.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> CrashDraw {
        let jackpot = &self.profile.jackpot;
        if jackpot.chance_bps > 0 && rng.gen_range(0..BPS_SCALE) < jackpot.chance_bps {
            return CrashDraw {
                crash_point: uniform(rng, jackpot.min, jackpot.max),
                growth_rate_milli: jackpot.growth_rate_milli,
                tier: CrashTier::Jackpot,
            };
        }

        let roll = rng.gen_range(0..BPS_SCALE);
        let band = self.band_for_roll(roll);
        CrashDraw {
            crash_point: uniform(rng, band.min, band.max),
            growth_rate_milli: band.growth_rate_milli,
            tier: band.tier,
        }
    }

    /// Map a roll in `[0, 10_000)` onto its band by cumulative probability.
    pub fn band_for_roll(&self, roll: u32) -> &CrashBand {
        let mut cumulative = 0u32;
        for band in &self.profile.bands {
            cumulative += band.probability_bps;
            if roll < cumulative {
                return band;
            }
        }
        // Validated profiles hold at least one band and sum to 10_000.
        &self.profile.bands[self.profile.bands.len() - 1]
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, min: Multiplier, max: Multiplier) -> Multiplier {
    Multiplier::from_hundredths(rng.gen_range(min.hundredths()..max.hundredths()))
}

/// Supplies the engine with one crash draw per round.
pub trait CrashSource {
    fn next_draw(&mut self) -> CrashDraw;
}

/// [`CrashSource`] backed by a [`CrashPointGenerator`] and an owned RNG.
pub struct RandomCrashSource<R> {
    generator: CrashPointGenerator,
    rng: R,
}

impl<R: RngCore> RandomCrashSource<R> {
    pub fn new(generator: CrashPointGenerator, rng: R) -> Self {
        Self { generator, rng }
    }
}

impl RandomCrashSource<ChaCha20Rng> {
    /// Deterministic source for replays and tests.
    pub fn seeded(generator: CrashPointGenerator, seed: u64) -> Self {
        Self::new(generator, ChaCha20Rng::seed_from_u64(seed))
    }

    pub fn from_entropy(generator: CrashPointGenerator) -> Self {
        Self::new(generator, ChaCha20Rng::from_entropy())
    }
}

impl<R: RngCore> CrashSource for RandomCrashSource<R> {
    fn next_draw(&mut self) -> CrashDraw {
        self.generator.generate(&mut self.rng)
    }
}
