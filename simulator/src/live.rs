//! Real-time host loop.
//!
//! Sleeps until the engine's next deadline, advances it to the elapsed time
//! and hands every event to the logger and the autoplay bot.

use std::time::Duration;

use anyhow::{bail, Result};
use crash_execution::{CrashEngine, CrashSource, EngineEvent};
use crash_types::Amount;
use serde::Serialize;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::bot::Bot;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LiveSummary {
    pub rounds: u64,
    pub bets: u64,
    pub wins: u64,
    pub wagered: Amount,
    pub returned: Amount,
    pub top_ups: u64,
    pub balance: Amount,
}

/// Drive `engine` in real time until `rounds` rounds have crashed (forever
/// when `None`) or ctrl-c.
pub async fn run<S: CrashSource>(
    engine: &mut CrashEngine<S>,
    bot: &mut Bot,
    rounds: Option<u64>,
) -> Result<LiveSummary> {
    let start = Instant::now();
    let mut crashed = 0u64;
    bot.on_betting(engine);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    while rounds.map_or(true, |limit| crashed < limit) {
        let Some(deadline) = engine.next_deadline() else {
            bail!("engine has no live timer");
        };
        // The engine clock starts at zero when the host starts.
        let wake = start + Duration::from_millis(deadline);
        tokio::select! {
            _ = time::sleep_until(wake) => {}
            _ = &mut shutdown => {
                info!("shutdown requested");
                break;
            }
        }

        let now = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        crashed += catch_up(engine, bot, now);
    }

    let stats = bot.stats();
    Ok(LiveSummary {
        rounds: crashed,
        bets: stats.bets,
        wins: stats.wins,
        wagered: Amount::from_minor(stats.wagered),
        returned: Amount::from_minor(stats.returned),
        top_ups: stats.top_ups,
        balance: engine.balance(),
    })
}

/// Advance through every deadline up to `now` one at a time, letting the bot
/// react after each. A late wake then replays the ticks it slept through
/// instead of handing the bot a single batch ending at the latest multiplier.
/// Returns the number of rounds that crashed.
pub fn catch_up<S: CrashSource>(engine: &mut CrashEngine<S>, bot: &mut Bot, now: u64) -> u64 {
    let mut crashed = 0;
    while let Some(deadline) = engine.next_deadline().filter(|&deadline| deadline <= now) {
        for event in engine.advance(deadline) {
            log_event(&event);
            if matches!(event, EngineEvent::Crashed { .. }) {
                crashed += 1;
            }
            bot.on_event(engine, &event);
        }
    }
    // Commands issued by the bot after the last tick.
    for event in engine.advance(now) {
        log_event(&event);
    }
    crashed
}

fn log_event(event: &EngineEvent) {
    match event {
        EngineEvent::MultiplierUpdated { round_id, multiplier } => {
            debug!(round_id, %multiplier, "tick");
        }
        EngineEvent::CountdownTick { round_id, remaining } => {
            info!(round_id, remaining, "countdown");
        }
        EngineEvent::RoundReset { round_id } => info!(round_id, "betting open"),
        _ => {}
    }
}
