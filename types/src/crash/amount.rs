use std::fmt;

use serde::{Deserialize, Serialize};

use super::{MICROS_PER_HUNDREDTH, MINOR_UNITS, MULTIPLIER_SCALE};

/// A non-negative quantity of money in minor units (cents).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    /// Build an amount from minor units (`12_345` is `123.45`).
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Build an amount from whole units, saturating on overflow.
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole.saturating_mul(MINOR_UNITS))
    }

    pub const fn minor(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Scale by a multiplier, flooring to the nearest minor unit.
    ///
    /// Computed in `u128` so the intermediate product cannot overflow; returns
    /// `None` only if the result does not fit back into `u64`.
    pub fn times(self, multiplier: Multiplier) -> Option<Self> {
        let scaled = (self.0 as u128) * (multiplier.hundredths() as u128)
            / MULTIPLIER_SCALE as u128;
        u64::try_from(scaled).ok().map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / MINOR_UNITS, self.0 % MINOR_UNITS)
    }
}

/// A payout multiplier with two decimal places (`250` is `2.50x`).
///
/// Two decimals is also the display precision, so comparisons against crash
/// points and auto-cashout thresholds happen on exactly what players see.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Multiplier(u32);

impl Multiplier {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(MULTIPLIER_SCALE);

    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> u32 {
        self.0
    }

    /// Truncate a micro-unit value (`1_000_000` is `1.00x`) to display precision.
    ///
    /// Truncation, never rounding: a displayed value must not overtake the
    /// underlying curve.
    pub fn from_micros_truncated(micros: u64) -> Self {
        let hundredths = micros / MICROS_PER_HUNDREDTH;
        Self(u32::try_from(hundredths).unwrap_or(u32::MAX))
    }

    pub const fn to_micros(self) -> u64 {
        self.0 as u64 * MICROS_PER_HUNDREDTH
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}x",
            self.0 / MULTIPLIER_SCALE,
            self.0 % MULTIPLIER_SCALE
        )
    }
}
