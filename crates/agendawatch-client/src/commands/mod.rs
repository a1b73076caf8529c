//! Subcommand implementations.

pub mod check;
pub mod config;
pub mod run;

use std::sync::Arc;

use tracing::info;

use agendawatch_providers::webdriver::WebDriverProvider;
use agendawatch_server::{AppConfig, PollLoop, ShutdownHandle, TelegramNotifier};

use crate::config::webdriver_config;
use crate::error::ClientResult;

/// Builds the Telegram notifier and checks its token with the API.
async fn verified_notifier(config: &AppConfig) -> ClientResult<TelegramNotifier> {
    let notifier = TelegramNotifier::new(config.telegram_config())?;
    let bot = notifier.verify().await?;
    info!(bot = %bot, "Telegram bot verified");
    println!("Using Telegram bot {}", bot);
    Ok(notifier)
}

/// Opens the browser and wires it into a poll loop.
async fn watcher(
    config: &AppConfig,
    notifier: TelegramNotifier,
    shutdown: ShutdownHandle,
) -> ClientResult<PollLoop> {
    let provider = WebDriverProvider::connect(webdriver_config(config)).await?;
    Ok(PollLoop::new(
        Arc::new(provider),
        Arc::new(notifier),
        config.session_config(),
        config.poll_config(),
        shutdown,
    ))
}
