//! Login and re-login against the observed site.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use url::Url;

use agendawatch_providers::{ContentProvider, Credentials, ProviderError};

use crate::error::ServerResult;
use crate::signals::ShutdownHandle;

/// Where the manager believes the browser session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No usable session; a login is needed.
    LoggedOut,
    /// A login attempt is in flight.
    LoggingIn,
    /// The last login landed on the start page.
    Active,
    /// Nothing has been tried yet.
    Unknown,
}

/// Login policy.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Address a successful login lands on.
    pub start_url: Url,
    /// Account used for the form.
    pub credentials: Credentials,
    /// Attempts before giving up.
    pub max_attempts: u32,
    /// How long each form element may take to render.
    pub form_timeout: Duration,
    /// Wait after submitting before checking where we landed.
    pub settle_delay: Duration,
    /// Pause between failed attempts.
    pub retry_backoff: Duration,
}

impl SessionConfig {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_FORM_TIMEOUT: Duration = Duration::from_secs(20);
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(20);
    pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(5);

    /// Creates a config with the default retry policy.
    pub fn new(start_url: Url, credentials: Credentials) -> Self {
        Self {
            start_url,
            credentials,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            form_timeout: Self::DEFAULT_FORM_TIMEOUT,
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
            retry_backoff: Self::DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Builder: set attempt budget. Zero is treated as one.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Builder: set form render timeout.
    pub fn with_form_timeout(mut self, timeout: Duration) -> Self {
        self.form_timeout = timeout;
        self
    }

    /// Builder: set post-submit settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Builder: set pause between attempts.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}

/// Result of a single login attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The browser ended up on the start page.
    Success,
    /// The form was submitted but the site kept us elsewhere.
    Rejected { landed_on: Url },
    /// The automation layer failed before we could tell.
    Failed(ProviderError),
}

impl AttemptOutcome {
    /// Returns true for [`AttemptOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Owns the login procedure and the session state.
pub struct SessionManager {
    provider: Arc<dyn ContentProvider>,
    config: SessionConfig,
    shutdown: ShutdownHandle,
    state: SessionState,
}

impl SessionManager {
    /// Creates a manager in the [`SessionState::Unknown`] state.
    pub fn new(
        provider: Arc<dyn ContentProvider>,
        config: SessionConfig,
        shutdown: ShutdownHandle,
    ) -> Self {
        Self {
            provider,
            config,
            shutdown,
            state: SessionState::Unknown,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Login policy in use.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Logs in, retrying up to the configured attempt budget.
    ///
    /// Returns `Ok(true)` once an attempt lands on the start page and
    /// `Ok(false)` when the budget is spent. Provider failures count as
    /// failed attempts. The only error is [`crate::error::ServerError::Interrupted`].
    pub async fn login(&mut self) -> ServerResult<bool> {
        self.transition(SessionState::LoggingIn);
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            info!(attempt, max_attempts, "Logging in");

            let outcome = match self.attempt().await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.transition(SessionState::LoggedOut);
                    return Err(e);
                }
            };

            match outcome {
                AttemptOutcome::Success => {
                    info!(attempt, "Login succeeded");
                    self.transition(SessionState::Active);
                    return Ok(true);
                }
                AttemptOutcome::Rejected { landed_on } => {
                    warn!(attempt, landed_on = %landed_on, "Login did not reach the start page");
                }
                AttemptOutcome::Failed(e) => {
                    warn!(attempt, error = %e, retryable = e.is_retryable(), "Login attempt failed");
                }
            }

            if attempt < max_attempts {
                if let Err(e) = self.shutdown.sleep(self.config.retry_backoff).await {
                    self.transition(SessionState::LoggedOut);
                    return Err(e);
                }
            }
        }

        error!(attempts = max_attempts, "Giving up on login");
        self.transition(SessionState::LoggedOut);
        Ok(false)
    }

    /// Runs one navigate, submit, settle and verify sequence.
    async fn attempt(&self) -> ServerResult<AttemptOutcome> {
        let provider = self.provider.as_ref();
        let config = &self.config;

        let submitted = self
            .shutdown
            .guard(async {
                provider.open(&config.start_url).await?;
                provider
                    .submit_credentials(&config.credentials, config.form_timeout)
                    .await?;
                Ok::<(), ProviderError>(())
            })
            .await?;
        if let Err(e) = submitted {
            return Ok(AttemptOutcome::Failed(e));
        }

        self.shutdown.sleep(config.settle_delay).await?;

        let outcome = match self.shutdown.guard(provider.current_url()).await? {
            Ok(url) if url == config.start_url => AttemptOutcome::Success,
            Ok(url) => AttemptOutcome::Rejected { landed_on: url },
            Err(e) => AttemptOutcome::Failed(e),
        };
        Ok(outcome)
    }

    /// Records that the agenda disappeared and a new login is needed.
    pub fn mark_expired(&mut self) {
        if self.state == SessionState::Active {
            info!("Session expired");
        }
        self.transition(SessionState::LoggedOut);
    }

    /// Asks the provider whether the session still looks logged in.
    ///
    /// Updates the state to match; provider failures leave it unchanged.
    pub async fn probe(&mut self) -> ServerResult<bool> {
        match self.shutdown.guard(self.provider.is_session_active()).await? {
            Ok(true) => {
                self.transition(SessionState::Active);
                Ok(true)
            }
            Ok(false) => {
                self.transition(SessionState::LoggedOut);
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Session probe failed");
                Ok(false)
            }
        }
    }

    fn transition(&mut self, to: SessionState) {
        if self.state != to {
            debug!(from = ?self.state, to = ?to, "Session state change");
            self.state = to;
        }
    }
}
