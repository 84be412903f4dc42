use thiserror::Error as ThisError;

use super::{AccountId, Amount, Multiplier, Phase};

/// Rejection of a `place_bet` command. State is left untouched.
#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum InvalidBet {
    #[error("bet amount must be positive")]
    NonPositiveAmount,
    #[error("bet of {amount} exceeds available balance {available}")]
    InsufficientBalance { amount: Amount, available: Amount },
    #[error("a bet has already been placed this round")]
    AlreadyPlaced,
    #[error("betting is closed (phase={phase})")]
    BettingClosed { phase: Phase },
    #[error("auto-cashout {threshold} must exceed the start multiplier {start}")]
    AutoCashoutTooLow {
        threshold: Multiplier,
        start: Multiplier,
    },
}

/// Rejection of a `cash_out` command. State is left untouched.
#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum InvalidCashout {
    #[error("round is not running (phase={phase})")]
    NotRunning { phase: Phase },
    #[error("no bet placed this round")]
    NoBet,
    #[error("already cashed out this round")]
    AlreadyCashedOut,
}

#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Raised by account switches (and deposits) naming an account the ledger does not hold.
    #[error("unknown account: {0}")]
    UnknownAccount(AccountId),
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("insufficient funds in {account} (requested={requested}, available={available})")]
    InsufficientFunds {
        account: AccountId,
        requested: Amount,
        available: Amount,
    },
    #[error("balance overflow in {0}")]
    Overflow(AccountId),
}

#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("band probabilities sum to {0} bps (expected 10000)")]
    ProbabilitySum(u32),
    #[error("band {index} has an empty or non-positive range")]
    InvalidRange { index: usize },
    #[error("bands {first} and {second} overlap")]
    Overlap { first: usize, second: usize },
    #[error("jackpot chance {0} bps exceeds 10000")]
    JackpotChance(u32),
    #[error("start multiplier {start} exceeds the lowest crash point {floor}")]
    StartAboveCrashFloor { start: Multiplier, floor: Multiplier },
}

/// Any rejection the engine can signal to a caller.
#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Bet(#[from] InvalidBet),
    #[error(transparent)]
    Cashout(#[from] InvalidCashout),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
