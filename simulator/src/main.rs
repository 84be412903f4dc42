use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crash_execution::{CrashEngine, CrashPointGenerator, Ledger, RandomCrashSource};
use crash_simulator::{bot::Bot, edge, live, settings, BotConfig};
use crash_types::Multiplier;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Local host for the crash round engine")]
struct Args {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run rounds in real time with an autoplay bot.
    Live {
        /// Stop after this many rounds (runs until ctrl-c when omitted).
        #[arg(long)]
        rounds: Option<u64>,

        /// Seed for crash points and the bot (random when omitted).
        #[arg(long)]
        seed: Option<u64>,

        /// YAML engine config.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Estimate win rate and house edge for a fixed auto-cashout target.
    Edge {
        /// Auto-cashout target in hundredths (200 = 2.00x).
        #[arg(long, default_value_t = 200)]
        target: u32,

        #[arg(long, default_value_t = 1_000_000)]
        trials: u64,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// YAML engine config (only the crash profile is used).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse args
    let args = Args::parse();

    // Create logger
    init_tracing(args.json);

    match args.command {
        Command::Live { rounds, seed, config } => {
            let config = settings::load(config.as_deref())?;
            let betting_ms = config.betting_duration_ms();
            let generator = CrashPointGenerator::new(config.profile.clone())
                .context("invalid crash profile")?;
            let source = match seed {
                Some(seed) => RandomCrashSource::seeded(generator, seed),
                None => RandomCrashSource::from_entropy(generator),
            };
            let mut engine = CrashEngine::new(config, Ledger::default(), source, 0)
                .context("failed to start engine")?;
            let mut bot = Bot::new(BotConfig {
                seed: seed.unwrap_or_else(rand::random),
                ..BotConfig::default()
            });
            info!(?rounds, ?seed, betting_ms, "live table started");

            let summary = live::run(&mut engine, &mut bot, rounds).await?;
            info!(
                rounds = summary.rounds,
                bets = summary.bets,
                wins = summary.wins,
                balance = %summary.balance,
                "live table stopped"
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Edge {
            target,
            trials,
            seed,
            config,
        } => {
            let config = settings::load(config.as_deref())?;
            let generator =
                CrashPointGenerator::new(config.profile).context("invalid crash profile")?;
            let target = Multiplier::from_hundredths(target);
            let report = edge::estimate(&generator, target, trials, seed);
            let analytic = edge::analytic_win_bps(&generator, target);
            info!(
                %target,
                trials,
                win_rate = report.win_rate,
                analytic_win_bps = analytic,
                house_edge = report.house_edge,
                "edge estimate"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_live_args() {
        let args = Args::parse_from([
            "crash-simulator",
            "live",
            "--rounds",
            "5",
            "--seed",
            "7",
            "--config",
            "crash.yaml",
        ]);
        match args.command {
            Command::Live { rounds, seed, config } => {
                assert_eq!(rounds, Some(5));
                assert_eq!(seed, Some(7));
                assert_eq!(config, Some(PathBuf::from("crash.yaml")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(!args.json);
    }

    #[test]
    fn parses_edge_defaults() {
        let args = Args::parse_from(["crash-simulator", "--json", "edge"]);
        assert!(args.json);
        match args.command {
            Command::Edge { target, trials, seed, config } => {
                assert_eq!(target, 200);
                assert_eq!(trials, 1_000_000);
                assert_eq!(seed, 0);
                assert!(config.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_subcommand() {
        assert!(Args::try_parse_from(["crash-simulator"]).is_err());
    }
}
