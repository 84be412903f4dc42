use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AccountId, Amount, Multiplier};

/// Phase of the single active round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Betting,
    Running,
    Crashed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Betting => "betting",
            Phase::Running => "running",
            Phase::Crashed => "crashed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability band a crash point was drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrashTier {
    Low,
    Mid,
    High,
    Jackpot,
}

/// A wager committed for the current round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub amount: Amount,
    #[serde(rename = "autoCashout", skip_serializing_if = "Option::is_none")]
    pub auto_cashout: Option<Multiplier>,
    /// Account the stake was debited from; winnings return here.
    pub account: AccountId,
}

/// Outcome of a finished round, as shown in the history strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    #[serde(rename = "multiplier")]
    pub multiplier_at_end: Multiplier,
    pub won: bool,
}

/// Read-only view of the engine handed to rendering collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundSnapshot {
    #[serde(rename = "roundId")]
    pub round_id: u64,
    pub phase: Phase,
    pub multiplier: Multiplier,
    /// Hidden until the round has crashed.
    #[serde(rename = "crashPoint", skip_serializing_if = "Option::is_none")]
    pub crash_point: Option<Multiplier>,
    pub countdown: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bet: Option<Bet>,
    #[serde(rename = "cashedOut")]
    pub cashed_out: bool,
    #[serde(rename = "winAmount")]
    pub win_amount: Amount,
    pub jackpot: bool,
    pub history: Vec<RoundResult>,
    pub account: AccountId,
    pub balance: Amount,
}
