//! agendawatch CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use agendawatch_client::cli::{Cli, Command, ConfigAction};
use agendawatch_client::commands;
use agendawatch_client::config;
use agendawatch_client::error::{ClientError, ClientResult, EXIT_STARTUP_FAILURE};
use agendawatch_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    }
    .with_format(cli.log_format);

    if let Err(e) = init_tracing(tracing) {
        eprintln!("error: {}", ClientError::from(e));
        return ExitCode::from(EXIT_STARTUP_FAILURE);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_interrupt() => {
            info!("Interrupted");
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            error!(error = %e, exit_code = e.exit_code(), "Exiting with failure");
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = config::load(&cli.config)?;

    match cli.subcommand() {
        Command::Run => commands::run::run(&config).await,
        Command::Check => commands::check::check(&config).await,
        Command::Config { action } => match action {
            ConfigAction::Validate => commands::config::validate(&cli.config, &config),
            ConfigAction::Dump => commands::config::dump(&cli.config, &config),
        },
    }
}
