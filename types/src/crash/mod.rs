//! Crash domain types.
//!
//! Defines amounts, multipliers, accounts, round state records and the error
//! taxonomy used by the execution layer and its hosts.

mod account;
mod amount;
mod constants;
mod error;
mod round;

pub use account::*;
pub use amount::*;
pub use constants::*;
pub use error::*;
pub use round::*;
