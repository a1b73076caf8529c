//! Error types for page content provider operations.
//!
//! These cover everything that can go wrong while driving the observed page:
//! navigation, element lookup, waits, and the automation session itself.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
///
/// Used by the session manager to decide whether a login attempt failed
/// transiently and by log lines as a stable machine-readable tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Navigation or refresh failed (network, DNS, page crash).
    Navigation,
    /// A bounded wait expired before the page reached the expected state.
    Timeout,
    /// An expected element was not present on the page.
    ElementNotFound,
    /// The automation session could not be created or was lost.
    Session,
    /// The page rendered content the provider could not interpret.
    InvalidContent,
    /// Configuration error - bad endpoint or capabilities.
    Configuration,
    /// Internal provider error - unexpected state, bug.
    Internal,
}

impl ProviderErrorCode {
    /// Returns true if this error is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Navigation | Self::Timeout | Self::ElementNotFound
        )
    }

    /// Returns a stable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::Timeout => "timeout",
            Self::ElementNotFound => "element_not_found",
            Self::Session => "session",
            Self::InvalidContent => "invalid_content",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while driving the observed page.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// The provider that generated this error (e.g. "webdriver", "fixture").
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Creates a navigation error.
    pub fn navigation(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Navigation, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Timeout, message)
    }

    /// Creates an element-not-found error.
    pub fn element_not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ElementNotFound, message)
    }

    /// Creates a session error.
    pub fn session(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Session, message)
    }

    /// Creates an invalid content error.
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidContent, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Configuration, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Internal, message)
    }

    /// Sets the provider name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
