//! CLI for the watchdl download monitor.
//!
//! Only the ledger-facing operations live here; the network-facing
//! collaborators (content source, downloader) are supplied by embedding
//! applications, not this binary.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use watchdl_core::config;
use watchdl_core::history::HistoryLedger;

use commands::{run_clear_history, run_config, run_history};

/// Top-level CLI for the watchdl download monitor.
#[derive(Debug, Parser)]
#[command(name = "watchdl")]
#[command(about = "watchdl: monitored account-content download manager", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show the download history ledger.
    History,

    /// Wipe the download history ledger.
    ClearHistory {
        /// Confirm the wipe (required).
        #[arg(long)]
        yes: bool,
    },

    /// Show the effective configuration and where it was loaded from.
    Config,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::History => {
                let ledger = HistoryLedger::open(HistoryLedger::default_path()?);
                run_history(&ledger)
            }
            CliCommand::ClearHistory { yes } => {
                let mut ledger = HistoryLedger::open(HistoryLedger::default_path()?);
                run_clear_history(&mut ledger, yes)
            }
            CliCommand::Config => run_config(&cfg),
        }
    }
}

#[cfg(test)]
mod tests;
