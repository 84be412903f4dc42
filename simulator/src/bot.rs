//! Autoplay player for the live host.

use crash_execution::{CrashEngine, CrashSource, EngineEvent};
use crash_types::{Amount, Multiplier, Phase};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Chance of sitting a round out, in percent.
    pub skip_pct: u8,
    pub bet_min: u64,
    pub bet_max: u64,
    /// Auto-cashout range in hundredths.
    pub target_min: u32,
    pub target_max: u32,
    /// Chance of cashing out by hand instead of setting an auto target, in percent.
    pub manual_pct: u8,
    /// Top-up the active account when it falls below `bet_min`.
    pub top_up: Amount,
    pub seed: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            skip_pct: 10,
            bet_min: 1,
            bet_max: 50,
            target_min: 110,
            target_max: 300,
            manual_pct: 30,
            top_up: Amount::from_whole(1_000),
            seed: 42,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BotStats {
    pub bets: u64,
    pub wins: u64,
    pub wagered: u64,
    pub returned: u64,
    pub top_ups: u64,
}

pub struct Bot {
    config: BotConfig,
    rng: StdRng,
    /// Manual cash-out target for the current round.
    manual_target: Option<Multiplier>,
    stats: BotStats,
}

impl Bot {
    pub fn new(config: BotConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            manual_target: None,
            stats: BotStats::default(),
        }
    }

    pub fn stats(&self) -> BotStats {
        self.stats
    }

    /// Place this round's bet if the engine is taking bets.
    pub fn on_betting<S: CrashSource>(&mut self, engine: &mut CrashEngine<S>) {
        self.manual_target = None;
        if engine.phase() != Phase::Betting || engine.bet().is_some() {
            return;
        }
        if self.rng.gen_range(0..100) < self.config.skip_pct {
            debug!(round_id = engine.round_id(), "bot sitting out");
            return;
        }

        let min = Amount::from_whole(self.config.bet_min);
        if engine.balance() < min {
            let account = engine.ledger().active().clone();
            if engine.deposit(&account, self.config.top_up).is_ok() {
                self.stats.top_ups += 1;
                info!(%account, amount = %self.config.top_up, "bot topped up");
            }
        }

        let max = self.config.bet_max.max(self.config.bet_min);
        let stake = Amount::from_whole(self.rng.gen_range(self.config.bet_min..=max)).min(engine.balance());
        let target = Multiplier::from_hundredths(
            self.rng
                .gen_range(self.config.target_min..=self.config.target_max.max(self.config.target_min)),
        );
        let auto = if self.rng.gen_range(0..100) < self.config.manual_pct {
            self.manual_target = Some(target);
            None
        } else {
            Some(target)
        };

        if engine.place_bet(stake, auto).is_ok() {
            self.stats.bets += 1;
            self.stats.wagered += stake.minor();
        }
    }

    /// React to an engine event.
    ///
    /// A manual cash-out is taken at the engine's current multiplier, so the
    /// host must deliver each tick's events before advancing to the next
    /// deadline (see [`crate::live::catch_up`]).
    pub fn on_event<S: CrashSource>(&mut self, engine: &mut CrashEngine<S>, event: &EngineEvent) {
        match event {
            EngineEvent::MultiplierUpdated { multiplier, .. } => {
                let Some(target) = self.manual_target else {
                    return;
                };
                if *multiplier >= target && engine.phase() == Phase::Running {
                    self.manual_target = None;
                    if let Ok(win) = engine.cash_out() {
                        self.record_win(win);
                    }
                }
            }
            EngineEvent::CashedOut { auto: true, win_amount, .. } => self.record_win(*win_amount),
            EngineEvent::RoundReset { .. } => self.on_betting(engine),
            _ => {}
        }
    }

    fn record_win(&mut self, win: Amount) {
        self.stats.wins += 1;
        self.stats.returned += win.minor();
    }
}
