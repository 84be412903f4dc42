/// Minor units per whole currency unit (amounts are stored in cents).
pub const MINOR_UNITS: u64 = 100;

/// Hundredths per `1.00x`.
pub const MULTIPLIER_SCALE: u32 = 100;

/// Internal growth precision per `1.00x`.
pub const MICROS_PER_MULTIPLIER: u64 = 1_000_000;

/// Micro-units collapsed into one displayed hundredth.
pub const MICROS_PER_HUNDREDTH: u64 = MICROS_PER_MULTIPLIER / MULTIPLIER_SCALE as u64;

/// Basis points representing certainty.
pub const BPS_SCALE: u32 = 10_000;

/// Starting demo balance (1000.00).
pub const DEMO_STARTING_BALANCE: u64 = 1_000 * MINOR_UNITS;

/// Starting real balance; funded through deposits.
pub const REAL_STARTING_BALANCE: u64 = 0;

/// Name of the practice account.
pub const DEMO_ACCOUNT: &str = "demo";

/// Name of the real-money account.
pub const REAL_ACCOUNT: &str = "real";

/// Number of settled rounds kept in the history strip.
pub const DEFAULT_HISTORY_LEN: usize = 10;
