//! Offline estimate of win rate and house edge for a fixed auto-cashout target.
//!
//! A round pays `target` when the target is at or below the drawn crash point
//! (the same rule the engine applies to auto-cashout) and nothing otherwise,
//! so the return to player is `P(crash >= target) * target`.

use std::collections::BTreeMap;

use crash_execution::CrashPointGenerator;
use crash_types::{CrashTier, Multiplier, BPS_SCALE, MULTIPLIER_SCALE};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeReport {
    pub trials: u64,
    pub target: Multiplier,
    pub wins: u64,
    /// Fraction of rounds won.
    pub win_rate: f64,
    /// Expected return per unit staked.
    pub rtp: f64,
    pub house_edge: f64,
    pub tiers: BTreeMap<String, u64>,
    /// Mean crash point in hundredths.
    pub mean_crash: f64,
}

pub fn estimate(
    generator: &CrashPointGenerator,
    target: Multiplier,
    trials: u64,
    seed: u64,
) -> EdgeReport {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut wins = 0u64;
    let mut crash_sum = 0u128;
    let mut tiers: BTreeMap<String, u64> = BTreeMap::new();

    for _ in 0..trials {
        let draw = generator.generate(&mut rng);
        crash_sum += draw.crash_point.hundredths() as u128;
        *tiers.entry(tier_name(draw.tier).to_string()).or_default() += 1;
        if target <= draw.crash_point {
            wins += 1;
        }
    }

    let denominator = trials.max(1) as f64;
    let win_rate = wins as f64 / denominator;
    let rtp = win_rate * target.hundredths() as f64 / MULTIPLIER_SCALE as f64;
    EdgeReport {
        trials,
        target,
        wins,
        win_rate,
        rtp,
        house_edge: 1.0 - rtp,
        tiers,
        mean_crash: crash_sum as f64 / denominator,
    }
}

/// Closed-form win probability for `target` in basis points, from the band
/// table alone (uniform draws within each band).
pub fn analytic_win_bps(generator: &CrashPointGenerator, target: Multiplier) -> u64 {
    let profile = generator.profile();
    let jackpot = &profile.jackpot;
    let above = |min: Multiplier, max: Multiplier| -> (u64, u64) {
        // Draws are uniform over [min, max) in hundredths.
        let span = (max.hundredths() - min.hundredths()) as u64;
        let t = target.hundredths();
        let winners = if t <= min.hundredths() {
            span
        } else if t >= max.hundredths() {
            0
        } else {
            (max.hundredths() - t) as u64
        };
        (winners, span)
    };

    let scale = BPS_SCALE as u64;
    let mut total = 0u64;
    let band_share = scale - jackpot.chance_bps as u64;
    for band in &profile.bands {
        let (winners, span) = above(band.min, band.max);
        total += band_share * band.probability_bps as u64 * winners / (span * scale);
    }
    if jackpot.chance_bps > 0 {
        let (winners, span) = above(jackpot.min, jackpot.max);
        total += jackpot.chance_bps as u64 * winners / span;
    }
    total
}

fn tier_name(tier: CrashTier) -> &'static str {
    match tier {
        CrashTier::Low => "low",
        CrashTier::Mid => "mid",
        CrashTier::High => "high",
        CrashTier::Jackpot => "jackpot",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crash_execution::CrashProfile;

    fn generator() -> CrashPointGenerator {
        CrashPointGenerator::new(CrashProfile::default()).unwrap()
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let target = Multiplier::from_hundredths(200);
        let first = estimate(&generator(), target, 5_000, 9);
        let second = estimate(&generator(), target, 5_000, 9);
        assert_eq!(first, second);
        assert_eq!(first.tiers.values().sum::<u64>(), 5_000);
    }

    #[test]
    fn test_target_below_every_crash_always_wins() {
        let report = estimate(&generator(), Multiplier::from_hundredths(49), 2_000, 1);
        assert_eq!(report.wins, 2_000);
        assert!((report.win_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unreachable_target_never_wins() {
        let report = estimate(&generator(), Multiplier::from_hundredths(20_000), 2_000, 1);
        assert_eq!(report.wins, 0);
        assert!((report.house_edge - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_estimate_tracks_analytic_rate() {
        let generator = generator();
        let target = Multiplier::from_hundredths(200);
        let report = estimate(&generator, target, 200_000, 3);
        let analytic = analytic_win_bps(&generator, target) as f64 / BPS_SCALE as f64;
        assert!(
            (report.win_rate - analytic).abs() < 0.01,
            "simulated={} analytic={analytic}",
            report.win_rate
        );
        // Only the mid, high and jackpot tiers clear 2.00x, about 16.6% of rounds.
        assert!((0.14..0.18).contains(&report.win_rate));
    }

    #[test]
    fn test_target_equal_to_crash_point_wins() {
        let profile = CrashProfile {
            bands: vec![crash_execution::CrashBand {
                tier: CrashTier::Mid,
                probability_bps: BPS_SCALE,
                min: Multiplier::from_hundredths(200),
                max: Multiplier::from_hundredths(201),
                growth_rate_milli: 1_200,
            }],
            jackpot: crash_execution::JackpotConfig {
                chance_bps: 0,
                ..Default::default()
            },
        };
        let generator = CrashPointGenerator::new(profile).unwrap();
        let target = Multiplier::from_hundredths(200);
        assert_eq!(estimate(&generator, target, 500, 4).wins, 500);
        assert_eq!(analytic_win_bps(&generator, target), BPS_SCALE as u64);
        assert_eq!(analytic_win_bps(&generator, Multiplier::from_hundredths(201)), 0);
    }

    #[test]
    fn test_zero_trials() {
        let report = estimate(&generator(), Multiplier::ONE, 0, 0);
        assert_eq!(report.wins, 0);
        assert_eq!(report.win_rate, 0.0);
    }
}
