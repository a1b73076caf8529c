//! The `check` command: one login and one read, printed to stdout.

use agendawatch_core::message;
use agendawatch_server::{AppConfig, SignalHandler};

use crate::error::ClientResult;

/// Logs in once and prints the current agenda keys.
pub async fn check(config: &AppConfig) -> ClientResult<()> {
    let notifier = super::verified_notifier(config).await?;

    let signals = SignalHandler::new();
    signals.spawn_listener();

    let watcher = super::watcher(config, notifier, signals.shutdown_handle()).await?;
    let events = watcher.check_once().await?;

    println!("{}", message::baseline_summary(&events));
    Ok(())
}
