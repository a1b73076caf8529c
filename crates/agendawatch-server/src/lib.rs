//! Watcher runtime: configuration, login, polling and notifications.
//!
//! The pieces fit together like this:
//!
//! ```text
//! AppConfig ──► SessionConfig ─┐
//!           └─► PollConfig ────┼─► PollLoop ──► Notifier (Telegram)
//!       ContentProvider ───────┘      │
//!       ShutdownHandle ───────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use agendawatch_providers::FixtureProvider;
//! use agendawatch_server::{AppConfig, MemoryNotifier, PollLoop, SignalHandler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load("config.txt")?;
//!     let signals = SignalHandler::new();
//!     signals.spawn_listener();
//!
//!     let provider = Arc::new(FixtureProvider::new(config.start_url.clone()));
//!     let watcher = PollLoop::new(
//!         provider,
//!         Arc::new(MemoryNotifier::new()),
//!         config.session_config(),
//!         config.poll_config(),
//!         signals.shutdown_handle(),
//!     );
//!     watcher.run().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod notify;
mod poll;
mod session;
mod signals;

pub use config::{AppConfig, ConfigError, REQUIRED_KEYS, parse_pairs};
pub use error::{ServerError, ServerResult};
pub use notify::{
    BotIdentity, MemoryNotifier, Notifier, NotifyError, NotifyResult, TelegramConfig,
    TelegramNotifier,
};
pub use poll::{CycleReport, PollConfig, PollLoop};
pub use session::{AttemptOutcome, SessionConfig, SessionManager, SessionState};
pub use signals::{ShutdownHandle, ShutdownSignal, SignalHandler};
