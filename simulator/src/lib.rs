//! Local host for the crash round engine: a real-time autoplay loop and an
//! offline house-edge estimator.

pub mod bot;
pub mod edge;
pub mod live;
pub mod settings;

pub use bot::{Bot, BotConfig, BotStats};
pub use edge::{analytic_win_bps, estimate, EdgeReport};
pub use live::LiveSummary;
