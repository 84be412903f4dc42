//! Settlement of a round's single bet.
//!
//! Both the cash-out command and the crash transition go through [`settle`].
//! The stake is debited when the bet is placed, so the only balance effect
//! settlement ever produces is the cash-out credit, and it produces it at most
//! once per round: after `already_cashed_out` is set every further call is a
//! zero delta.

use crash_types::{Amount, Bet, Multiplier};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// Amount to credit to the bet's account now.
    pub balance_delta: Amount,
    /// Winnings locked in by this call (zero when nothing new was won).
    pub win_amount: Amount,
    /// Whether the bet is a winner.
    pub won: bool,
}

impl Settlement {
    const NONE: Self = Self {
        balance_delta: Amount::ZERO,
        win_amount: Amount::ZERO,
        won: false,
    };
}

pub fn settle(
    bet: Option<&Bet>,
    multiplier: Multiplier,
    crashed: bool,
    already_cashed_out: bool,
) -> Settlement {
    let Some(bet) = bet else {
        return Settlement::NONE;
    };
    if already_cashed_out {
        // Credited when the cash-out happened.
        return Settlement {
            won: true,
            ..Settlement::NONE
        };
    }
    if crashed {
        // Stake already debited at placement.
        return Settlement::NONE;
    }
    let win = bet
        .amount
        .times(multiplier)
        .unwrap_or(Amount::from_minor(u64::MAX));
    Settlement {
        balance_delta: win,
        win_amount: win,
        won: true,
    }
}
