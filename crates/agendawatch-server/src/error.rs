//! Server error types.

use std::io;
use thiserror::Error;

use agendawatch_providers::ProviderError;

use crate::config::ConfigError;
use crate::notify::NotifyError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can end a watcher run.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The notification endpoint rejected us.
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// The page automation failed outside of a login attempt.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Every login attempt failed.
    #[error("Login failed after {attempts} attempts")]
    LoginFailed { attempts: u32 },

    /// The agenda could not be read right after logging in.
    #[error("Could not read the agenda to establish a baseline")]
    BaselineUnavailable,

    /// The operator asked the watcher to stop.
    #[error("Interrupted by operator")]
    Interrupted,
}

impl ServerError {
    /// Creates a login failure error.
    pub fn login_failed(attempts: u32) -> Self {
        Self::LoginFailed { attempts }
    }

    /// Returns true for operator-initiated shutdown.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Self::Interrupted)
    }

    /// Returns true for failures that happen before polling starts.
    ///
    /// These end the process without a failure notification.
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Notify(_) | Self::LoginFailed { .. } | Self::BaselineUnavailable
        )
    }
}
