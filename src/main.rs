//! access-gate - operator CLI for the usage quota gate
//!
//! Loads the configured store, builds the gate for the stored session and
//! runs one operation, printing the result as JSON. Period resets are meant
//! to be driven by an external scheduler (cron, systemd timer) invoking
//! `reset-daily` / `reset-weekly`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use access_gate::application::AccessGate;
use access_gate::config::AppConfig;
use access_gate::domain::usage::QuotaKey;
use access_gate::telemetry::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "access-gate")]
#[command(about = "Inspect and maintain learner usage quotas", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show every quota with remaining uses and reset time
    Status,

    /// Check a quota (dailyQuizzes, dailyPractice, weeklyLessons, subjectsAccess)
    Check {
        key: QuotaKey,

        /// Consume one use if allowed
        #[arg(long)]
        consume: bool,
    },

    /// Check the premium-only feature gate
    Premium,

    /// Check whether another subject can be unlocked
    Subjects,

    /// Record one use of a quota
    Increment { key: QuotaKey },

    /// Add several uses at once, capped at the limit
    Simulate { key: QuotaKey, amount: u32 },

    /// Clear the daily quiz and practice counters
    ResetDaily,

    /// Clear the weekly lesson counter
    ResetWeekly,

    /// Clear every counter back to the configured limits
    ResetAll,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to render result as JSON")?;
    println!("{}", json);
    Ok(())
}

/// Environment-backed configuration, validated before anything is opened.
fn load_config() -> Result<AppConfig> {
    let config = AppConfig::load().context("failed to load configuration from environment")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config()?;
    init_tracing(&config.logging);
    info!(backend = ?config.storage.backend, "access gate starting");

    let defaults = config.quotas.defaults();
    let mut gate = AccessGate::load(config.storage.open(), &defaults);

    match cli.command {
        Commands::Status => print_json(&gate.usage_report())?,
        Commands::Check { key, consume } => print_json(&gate.check_usage_gate(key, consume))?,
        Commands::Premium => print_json(&gate.check_premium_gate())?,
        Commands::Subjects => print_json(&gate.check_multi_subject_gate())?,
        Commands::Increment { key } => {
            let recorded = gate.increment_usage(key);
            print_json(&serde_json::json!({
                "key": key,
                "recorded": recorded,
                "used": gate.usage_limits().get(key).used,
            }))?;
        }
        Commands::Simulate { key, amount } => {
            gate.simulate_usage(key, amount);
            print_json(&gate.usage_report())?;
        }
        Commands::ResetDaily => {
            gate.reset_daily_limits();
            print_json(&gate.usage_report())?;
        }
        Commands::ResetWeekly => {
            gate.reset_weekly_limits();
            print_json(&gate.usage_report())?;
        }
        Commands::ResetAll => {
            gate.reset_all_limits(&defaults);
            print_json(&gate.usage_report())?;
        }
    }

    Ok(())
}
