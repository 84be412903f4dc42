//! The round state machine.
//!
//! [`CrashEngine`] owns the single [`RoundState`], the [`Ledger`], the crash
//! source and the phase timers. It cycles
//!
//! ```text
//! Betting --countdown hits 0--> Running --multiplier >= crash point--> Crashed
//!    ^                                                                    |
//!    +-------------------------- reset delay ----------------------------+
//! ```
//!
//! Rounds start autonomously: the countdown runs in every betting phase and
//! starts the round when it reaches zero, with or without a bet.
//!
//! All mutation happens inside a command (`place_bet`, `cash_out`, ...) or
//! inside [`CrashEngine::advance`], which the host calls from one loop. There
//! is one writer at a time and no locking.

use std::collections::VecDeque;

use crash_types::{
    AccountId, Amount, Bet, ConfigError, CrashTier, EngineError, InvalidBet, InvalidCashout,
    LedgerError, Multiplier, Phase, RoundResult, RoundSnapshot,
};
use rand::RngCore;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::crash_point::{CrashPointGenerator, CrashSource, RandomCrashSource};
use crate::growth::GrowthCurve;
use crate::ledger::Ledger;
use crate::round_scheduler::{Scheduler, Timer, TimerHandle, TimerQueue};
use crate::settlement::settle;

/// Something observable that happened inside the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    BetPlaced {
        round_id: u64,
        account: AccountId,
        amount: Amount,
        auto_cashout: Option<Multiplier>,
    },
    CountdownTick {
        round_id: u64,
        remaining: u32,
    },
    RoundStarted {
        round_id: u64,
        jackpot: bool,
    },
    MultiplierUpdated {
        round_id: u64,
        multiplier: Multiplier,
    },
    CashedOut {
        round_id: u64,
        multiplier: Multiplier,
        win_amount: Amount,
        auto: bool,
    },
    Crashed {
        round_id: u64,
        crash_point: Multiplier,
        won: bool,
    },
    RoundReset {
        round_id: u64,
    },
}

/// Authoritative state of the current round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundState {
    pub phase: Phase,
    pub multiplier: Multiplier,
    /// Drawn once at round start; `None` while betting.
    pub crash_point: Option<Multiplier>,
    pub bet: Option<Bet>,
    pub cashed_out: bool,
    pub win_amount: Amount,
    pub countdown: u32,
    pub jackpot: bool,
    /// Most recent first.
    pub history: VecDeque<RoundResult>,
}

impl RoundState {
    fn new(config: &EngineConfig) -> Self {
        Self {
            phase: Phase::Betting,
            multiplier: config.start_multiplier,
            crash_point: None,
            bet: None,
            cashed_out: false,
            win_amount: Amount::ZERO,
            countdown: config.countdown_ticks,
            jackpot: false,
            history: VecDeque::with_capacity(config.history_len),
        }
    }

    /// Clear everything round-scoped; history survives.
    fn reset(&mut self, config: &EngineConfig) {
        self.phase = Phase::Betting;
        self.multiplier = config.start_multiplier;
        self.crash_point = None;
        self.bet = None;
        self.cashed_out = false;
        self.win_amount = Amount::ZERO;
        self.countdown = config.countdown_ticks;
        self.jackpot = false;
    }

    fn record(&mut self, result: RoundResult, cap: usize) {
        self.history.push_front(result);
        self.history.truncate(cap);
    }
}

pub struct CrashEngine<S> {
    config: EngineConfig,
    ledger: Ledger,
    source: S,
    state: RoundState,
    round_id: u64,
    timers: TimerQueue,
    active_timer: Option<TimerHandle>,
    curve: Option<GrowthCurve>,
    last_tick_ms: u64,
    now_ms: u64,
    events: Vec<EngineEvent>,
}

impl<R: RngCore> CrashEngine<RandomCrashSource<R>> {
    /// Engine drawing crash points from `config.profile` with `rng`.
    pub fn with_rng(
        config: EngineConfig,
        ledger: Ledger,
        rng: R,
        now_ms: u64,
    ) -> Result<Self, ConfigError> {
        let generator = CrashPointGenerator::new(config.profile.clone())?;
        Self::new(config, ledger, RandomCrashSource::new(generator, rng), now_ms)
    }
}

impl<S: CrashSource> CrashEngine<S> {
    /// Create an engine in the betting phase of round 1 with its countdown armed.
    pub fn new(
        config: EngineConfig,
        ledger: Ledger,
        source: S,
        now_ms: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = RoundState::new(&config);
        let mut engine = Self {
            config,
            ledger,
            source,
            state,
            round_id: 1,
            timers: TimerQueue::default(),
            active_timer: None,
            curve: None,
            last_tick_ms: now_ms,
            now_ms,
            events: Vec::new(),
        };
        engine.arm(now_ms, Timer::Countdown);
        info!(
            round_id = engine.round_id,
            countdown = engine.state.countdown,
            "crash engine started"
        );
        Ok(engine)
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    /// Commit a wager for the current round and debit it immediately.
    pub fn place_bet(
        &mut self,
        amount: Amount,
        auto_cashout: Option<Multiplier>,
    ) -> Result<(), InvalidBet> {
        let result = self.try_place_bet(amount, auto_cashout);
        if let Err(err) = &result {
            warn!(round_id = self.round_id, %amount, %err, "bet rejected");
        }
        result
    }

    fn try_place_bet(
        &mut self,
        amount: Amount,
        auto_cashout: Option<Multiplier>,
    ) -> Result<(), InvalidBet> {
        if self.state.phase != Phase::Betting {
            return Err(InvalidBet::BettingClosed {
                phase: self.state.phase,
            });
        }
        if self.state.bet.is_some() {
            return Err(InvalidBet::AlreadyPlaced);
        }
        if amount.is_zero() {
            return Err(InvalidBet::NonPositiveAmount);
        }
        if let Some(threshold) = auto_cashout {
            if threshold <= self.config.start_multiplier {
                return Err(InvalidBet::AutoCashoutTooLow {
                    threshold,
                    start: self.config.start_multiplier,
                });
            }
        }
        let available = self.ledger.balance();
        if amount > available {
            return Err(InvalidBet::InsufficientBalance { amount, available });
        }

        let account = self.ledger.active().clone();
        self.ledger
            .debit(&account, amount)
            .map_err(|_| InvalidBet::InsufficientBalance { amount, available })?;
        debug!(
            round_id = self.round_id,
            %account,
            %amount,
            auto_cashout = ?auto_cashout,
            "bet placed"
        );
        self.events.push(EngineEvent::BetPlaced {
            round_id: self.round_id,
            account: account.clone(),
            amount,
            auto_cashout,
        });
        self.state.bet = Some(Bet {
            amount,
            auto_cashout,
            account,
        });
        Ok(())
    }

    /// Lock in `bet * multiplier` at the current multiplier.
    ///
    /// Returns the amount credited. A second call in the same round is rejected
    /// with [`InvalidCashout::AlreadyCashedOut`] and changes nothing.
    pub fn cash_out(&mut self) -> Result<Amount, EngineError> {
        if self.state.phase != Phase::Running {
            let err = InvalidCashout::NotRunning {
                phase: self.state.phase,
            };
            warn!(round_id = self.round_id, %err, "cash-out rejected");
            return Err(err.into());
        }
        let multiplier = self.state.multiplier;
        let round_id = self.round_id;
        self.apply_cash_out(multiplier, false).inspect_err(|err| {
            warn!(round_id, %err, "cash-out rejected");
        })
    }

    pub fn switch_account(&mut self, account: &AccountId) -> Result<(), LedgerError> {
        self.ledger.switch_account(account).inspect_err(|err| {
            warn!(%err, "account switch rejected");
        })
    }

    pub fn deposit(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, LedgerError> {
        self.ledger.deposit(account, amount)
    }

    pub fn withdraw(&mut self, account: &AccountId, amount: Amount) -> Result<Amount, LedgerError> {
        self.ledger.withdraw(account, amount)
    }

    /// Fire every timer due at or before `now_ms` and return what happened,
    /// including events from commands issued since the last call.
    pub fn advance(&mut self, now_ms: u64) -> Vec<EngineEvent> {
        while let Some(fired) = self.timers.pop_due(now_ms) {
            if self.active_timer != Some(fired.handle) {
                warn!(?fired, "dropping stale timer");
                self.timers.cancel(fired.handle);
                continue;
            }
            self.now_ms = self.now_ms.max(fired.at_ms);
            match fired.timer {
                Timer::Countdown => self.on_countdown(fired.at_ms),
                Timer::Growth => self.on_growth(fired.at_ms),
                Timer::Reset => self.on_reset(fired.at_ms),
            }
        }
        self.now_ms = self.now_ms.max(now_ms);
        self.take_events()
    }

    /// Drain buffered events without advancing time.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn balance(&self) -> Amount {
        self.ledger.balance()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Latest time the engine has been advanced to.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn round_id(&self) -> u64 {
        self.round_id
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn multiplier(&self) -> Multiplier {
        self.state.multiplier
    }

    pub fn countdown(&self) -> u32 {
        self.state.countdown
    }

    pub fn bet(&self) -> Option<&Bet> {
        self.state.bet.as_ref()
    }

    pub fn cashed_out(&self) -> bool {
        self.state.cashed_out
    }

    pub fn win_amount(&self) -> Amount {
        self.state.win_amount
    }

    pub fn history(&self) -> impl Iterator<Item = &RoundResult> {
        self.state.history.iter()
    }

    /// When the host should next call [`CrashEngine::advance`].
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Crash point of the current round, visible only to tests and mocks.
    #[cfg(any(test, feature = "mocks"))]
    pub fn crash_point(&self) -> Option<Multiplier> {
        self.state.crash_point
    }

    #[cfg(any(test, feature = "mocks"))]
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// View for rendering; the crash point stays hidden until the crash.
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            round_id: self.round_id,
            phase: self.state.phase,
            multiplier: self.state.multiplier,
            crash_point: match self.state.phase {
                Phase::Crashed => self.state.crash_point,
                Phase::Betting | Phase::Running => None,
            },
            countdown: self.state.countdown,
            bet: self.state.bet.clone(),
            cashed_out: self.state.cashed_out,
            win_amount: self.state.win_amount,
            jackpot: self.state.jackpot,
            history: self.state.history.iter().copied().collect(),
            account: self.ledger.active().clone(),
            balance: self.ledger.balance(),
        }
    }

    // ---------------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------------

    /// Cancel the live timer (if any) and arm `timer`.
    fn arm(&mut self, now_ms: u64, timer: Timer) {
        if let Some(handle) = self.active_timer.take() {
            self.timers.cancel(handle);
        }
        let handle = match timer {
            Timer::Countdown => {
                self.timers
                    .schedule_recurring(now_ms, self.config.countdown_interval_ms, timer)
            }
            Timer::Growth => self
                .timers
                .schedule_recurring(now_ms, self.config.tick_ms, timer),
            Timer::Reset => self
                .timers
                .schedule_once(now_ms, self.config.crash_reset_delay_ms, timer),
        };
        self.active_timer = Some(handle);
    }

    fn on_countdown(&mut self, at_ms: u64) {
        self.state.countdown = self.state.countdown.saturating_sub(1);
        debug!(round_id = self.round_id, remaining = self.state.countdown, "countdown");
        self.events.push(EngineEvent::CountdownTick {
            round_id: self.round_id,
            remaining: self.state.countdown,
        });
        if self.state.countdown == 0 {
            self.start_round(at_ms);
        }
    }

    fn start_round(&mut self, at_ms: u64) {
        let draw = self.source.next_draw();
        self.state.phase = Phase::Running;
        self.state.crash_point = Some(draw.crash_point);
        self.state.multiplier = self.config.start_multiplier;
        self.state.cashed_out = false;
        self.state.win_amount = Amount::ZERO;
        self.state.jackpot = draw.tier == CrashTier::Jackpot;
        self.curve = Some(GrowthCurve::new(
            self.config.start_multiplier,
            draw.growth_rate_milli,
        ));
        self.last_tick_ms = at_ms;
        self.arm(at_ms, Timer::Growth);

        info!(
            round_id = self.round_id,
            tier = ?draw.tier,
            has_bet = self.state.bet.is_some(),
            "round started"
        );
        self.events.push(EngineEvent::RoundStarted {
            round_id: self.round_id,
            jackpot: self.state.jackpot,
        });
    }

    fn on_growth(&mut self, at_ms: u64) {
        let (Some(curve), Some(crash_point)) = (self.curve.as_mut(), self.state.crash_point) else {
            return;
        };
        let elapsed = at_ms.saturating_sub(self.last_tick_ms);
        self.last_tick_ms = at_ms;
        let multiplier = curve.advance(elapsed);

        // Never display past the crash point.
        self.state.multiplier = multiplier.min(crash_point);
        self.events.push(EngineEvent::MultiplierUpdated {
            round_id: self.round_id,
            multiplier: self.state.multiplier,
        });

        if let Some(threshold) = self.auto_cashout_due(multiplier, crash_point) {
            if let Err(err) = self.apply_cash_out(threshold, true) {
                warn!(round_id = self.round_id, %err, "auto cash-out failed");
            }
        }

        if multiplier >= crash_point {
            self.crash(at_ms);
        }
    }

    /// Threshold to pay if auto-cashout should fire on this tick.
    ///
    /// Auto-cashout is evaluated before the crash check, so a threshold equal
    /// to the crash point still pays. A threshold above the crash point was
    /// never reached on the real curve, even when a coarse tick overshoots both.
    fn auto_cashout_due(&self, multiplier: Multiplier, crash_point: Multiplier) -> Option<Multiplier> {
        if self.state.cashed_out {
            return None;
        }
        let threshold = self.state.bet.as_ref()?.auto_cashout?;
        (multiplier >= threshold && threshold <= crash_point).then_some(threshold)
    }

    fn apply_cash_out(&mut self, multiplier: Multiplier, auto: bool) -> Result<Amount, EngineError> {
        let Some(bet) = self.state.bet.as_ref() else {
            return Err(InvalidCashout::NoBet.into());
        };
        if self.state.cashed_out {
            return Err(InvalidCashout::AlreadyCashedOut.into());
        }
        let settlement = settle(Some(bet), multiplier, false, self.state.cashed_out);
        let balance = self.ledger.credit(&bet.account, settlement.balance_delta)?;

        info!(
            round_id = self.round_id,
            account = %bet.account,
            %multiplier,
            win = %settlement.win_amount,
            %balance,
            auto,
            "cashed out"
        );
        self.state.cashed_out = true;
        self.state.win_amount = settlement.win_amount;
        self.events.push(EngineEvent::CashedOut {
            round_id: self.round_id,
            multiplier,
            win_amount: settlement.win_amount,
            auto,
        });
        Ok(settlement.win_amount)
    }

    fn crash(&mut self, at_ms: u64) {
        let crash_point = self.state.crash_point.unwrap_or(self.state.multiplier);
        let settlement = settle(
            self.state.bet.as_ref(),
            self.state.multiplier,
            true,
            self.state.cashed_out,
        );
        let result = RoundResult {
            multiplier_at_end: self.state.multiplier,
            won: settlement.won,
        };
        self.state.record(result, self.config.history_len);
        self.state.phase = Phase::Crashed;
        self.curve = None;
        self.arm(at_ms, Timer::Reset);

        info!(
            round_id = self.round_id,
            %crash_point,
            won = result.won,
            has_bet = self.state.bet.is_some(),
            "round crashed"
        );
        self.events.push(EngineEvent::Crashed {
            round_id: self.round_id,
            crash_point,
            won: result.won,
        });
    }

    fn on_reset(&mut self, at_ms: u64) {
        self.state.reset(&self.config);
        self.round_id = self.round_id.saturating_add(1);
        self.arm(at_ms, Timer::Countdown);
        debug!(round_id = self.round_id, "round reset");
        self.events.push(EngineEvent::RoundReset {
            round_id: self.round_id,
        });
    }
}
