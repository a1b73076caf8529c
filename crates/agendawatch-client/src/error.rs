//! Client error types.

use std::fmt;

use agendawatch_core::TracingError;
use agendawatch_providers::ProviderError;
use agendawatch_server::{ConfigError, NotifyError, ServerError};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Exit code when the operator stops the process.
pub const EXIT_INTERRUPTED: u8 = 0;

/// Exit code for failures before the watcher starts polling.
pub const EXIT_STARTUP_FAILURE: u8 = 1;

/// Exit code for failures after polling started.
pub const EXIT_RUNTIME_FAILURE: u8 = 2;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration could not be loaded.
    Config(ConfigError),
    /// The Telegram bot could not be verified.
    Notify(NotifyError),
    /// The browser session could not be opened.
    Provider(ProviderError),
    /// The watcher stopped with an error.
    Server(ServerError),
    /// Logging could not be set up.
    Tracing(TracingError),
}

impl ClientError {
    /// Returns true if the operator stopped the process.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Self::Server(e) if e.is_interrupt())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Server(e) if e.is_interrupt() => EXIT_INTERRUPTED,
            Self::Server(e) if !e.is_startup_failure() => EXIT_RUNTIME_FAILURE,
            _ => EXIT_STARTUP_FAILURE,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {}", err),
            Self::Notify(err) => write!(f, "telegram bot check failed: {}", err),
            Self::Provider(err) => write!(f, "browser error: {}", err),
            Self::Server(err) => write!(f, "{}", err),
            Self::Tracing(err) => write!(f, "logging setup failed: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Notify(err) => Some(err),
            Self::Provider(err) => Some(err),
            Self::Server(err) => Some(err),
            Self::Tracing(err) => Some(err),
        }
    }
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<NotifyError> for ClientError {
    fn from(err: NotifyError) -> Self {
        Self::Notify(err)
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl From<ServerError> for ClientError {
    fn from(err: ServerError) -> Self {
        Self::Server(err)
    }
}

impl From<TracingError> for ClientError {
    fn from(err: TracingError) -> Self {
        Self::Tracing(err)
    }
}
