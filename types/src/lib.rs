//! Common types shared by the crash round engine and its hosts.
//!
//! Money and multipliers are fixed-point integers so balance arithmetic and
//! crash detection never depend on floating-point rounding.

pub mod crash;

pub use crash::*;
