//! The `run` command: watch until interrupted.

use agendawatch_server::{AppConfig, SignalHandler};

use crate::error::ClientResult;

/// Verifies the bot, opens the browser and runs the poll loop.
pub async fn run(config: &AppConfig) -> ClientResult<()> {
    let notifier = super::verified_notifier(config).await?;

    let signals = SignalHandler::new();
    signals.spawn_listener();

    let watcher = super::watcher(config, notifier, signals.shutdown_handle()).await?;
    watcher.run().await?;
    Ok(())
}
