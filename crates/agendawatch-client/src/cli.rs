//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use agendawatch_core::TracingOutputFormat;

/// agendawatch - watch a web agenda and report changes to Telegram
#[derive(Debug, Parser)]
#[command(name = "agendawatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the KEY=value configuration file
    #[arg(long, short, env = "AGENDAWATCH_CONFIG", default_value = "config.txt")]
    pub config: PathBuf,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log output format: pretty, compact or json
    #[arg(long, default_value = "compact")]
    pub log_format: TracingOutputFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The subcommand to run, `run` when none was given.
    pub fn subcommand(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Run)
    }
}

/// Available commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Verify the bot, then watch the agenda until interrupted
    Run,

    /// Verify the bot, log in once and print the current agenda
    Check,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ConfigAction {
    /// Check that the configuration loads and secrets resolve
    Validate,

    /// Print the effective configuration with secrets redacted
    Dump,
}
