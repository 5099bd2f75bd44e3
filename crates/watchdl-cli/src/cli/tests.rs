//! CLI parsing tests.

use clap::Parser;

use super::{Cli, CliCommand};

#[test]
fn parses_history() {
    let cli = Cli::try_parse_from(["watchdl", "history"]).unwrap();
    assert!(matches!(cli.command, CliCommand::History));
}

#[test]
fn parses_clear_history_with_confirmation() {
    let cli = Cli::try_parse_from(["watchdl", "clear-history", "--yes"]).unwrap();
    assert!(matches!(cli.command, CliCommand::ClearHistory { yes: true }));

    let cli = Cli::try_parse_from(["watchdl", "clear-history"]).unwrap();
    assert!(matches!(cli.command, CliCommand::ClearHistory { yes: false }));
}

#[test]
fn parses_config() {
    let cli = Cli::try_parse_from(["watchdl", "config"]).unwrap();
    assert!(matches!(cli.command, CliCommand::Config));
}

#[test]
fn rejects_unknown_command() {
    assert!(Cli::try_parse_from(["watchdl", "frobnicate"]).is_err());
}
