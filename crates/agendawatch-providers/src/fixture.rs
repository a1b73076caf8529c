//! Scripted content provider.
//!
//! [`FixtureProvider`] replays a queue of login outcomes and agenda snapshots
//! instead of driving a browser. Session and polling logic is tested against
//! it, and it doubles as a dry-run backend.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tracing::trace;
use url::Url;

use agendawatch_core::RawEvent;

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::provider::{AgendaFetch, BoxFuture, ContentProvider, Credentials};

const PROVIDER_NAME: &str = "fixture";

/// Scripted result of one credential submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStep {
    /// The site accepts the credentials and lands back on the start page.
    Accept,
    /// The site rejects the credentials and stays on an error page.
    Reject,
    /// The automation layer fails with the given error category.
    Fail(ProviderErrorCode),
}

/// Scripted result of one agenda read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgendaStep {
    /// The agenda renders with these cards.
    Events(Vec<RawEvent>),
    /// The agenda marker is missing (session expired).
    Unavailable,
    /// The automation layer fails with the given error category.
    Fail(ProviderErrorCode),
}

/// Counters of the calls a fixture has served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixtureStats {
    pub navigations: u32,
    pub login_attempts: u32,
    pub refreshes: u32,
    pub agenda_reads: u32,
    pub closes: u32,
}

#[derive(Debug, Default)]
struct FixtureState {
    logins: VecDeque<LoginStep>,
    agendas: VecDeque<AgendaStep>,
    current_url: Option<Url>,
    last_events: Vec<RawEvent>,
    last_available: bool,
    stats: FixtureStats,
}

type ExhaustedHook = Box<dyn Fn() + Send + Sync>;

/// A [`ContentProvider`] that plays back a script.
///
/// Logins default to [`LoginStep::Accept`] once the login script runs out.
/// When the agenda script runs out, the exhausted hook fires (tests use it to
/// stop the watcher) and the last snapshot is served again.
pub struct FixtureProvider {
    start_url: Url,
    state: Mutex<FixtureState>,
    on_exhausted: Option<ExhaustedHook>,
}

impl FixtureProvider {
    /// Creates an empty fixture whose successful logins land on `start_url`.
    pub fn new(start_url: Url) -> Self {
        Self {
            start_url,
            state: Mutex::new(FixtureState::default()),
            on_exhausted: None,
        }
    }

    /// Builder: queue login outcomes.
    pub fn with_logins(self, steps: impl IntoIterator<Item = LoginStep>) -> Self {
        self.lock().logins.extend(steps);
        self
    }

    /// Builder: queue agenda snapshots.
    pub fn with_agendas(self, steps: impl IntoIterator<Item = AgendaStep>) -> Self {
        self.lock().agendas.extend(steps);
        self
    }

    /// Builder: run `hook` every time an agenda read finds the script empty.
    pub fn with_exhausted_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_exhausted = Some(Box::new(hook));
        self
    }

    /// Returns the call counters so far.
    pub fn stats(&self) -> FixtureStats {
        self.lock().stats
    }

    fn lock(&self) -> MutexGuard<'_, FixtureState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn scripted_failure(code: ProviderErrorCode) -> ProviderError {
        ProviderError::new(code, "scripted failure").with_provider(PROVIDER_NAME)
    }

    fn rejected_url(&self) -> Url {
        self.start_url
            .join("login?error=invalid_credentials")
            .unwrap_or_else(|_| self.start_url.clone())
    }

    fn next_agenda(&self) -> ProviderResult<AgendaFetch> {
        let step = {
            let mut state = self.lock();
            state.stats.agenda_reads += 1;
            state.agendas.pop_front()
        };

        let Some(step) = step else {
            if let Some(hook) = &self.on_exhausted {
                hook();
            }
            let state = self.lock();
            return Ok(if state.last_available {
                AgendaFetch::Available(state.last_events.clone())
            } else {
                AgendaFetch::Unavailable
            });
        };

        let mut state = self.lock();
        match step {
            AgendaStep::Events(events) => {
                state.last_events = events.clone();
                state.last_available = true;
                Ok(AgendaFetch::Available(events))
            }
            AgendaStep::Unavailable => {
                state.last_available = false;
                Ok(AgendaFetch::Unavailable)
            }
            AgendaStep::Fail(code) => Err(Self::scripted_failure(code)),
        }
    }
}

impl ContentProvider for FixtureProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn open<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            let mut state = self.lock();
            state.stats.navigations += 1;
            state.current_url = Some(url.clone());
            Ok(())
        })
    }

    fn submit_credentials<'a>(
        &'a self,
        credentials: &'a Credentials,
        _form_timeout: Duration,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            let mut state = self.lock();
            state.stats.login_attempts += 1;
            let step = state.logins.pop_front().unwrap_or(LoginStep::Accept);
            trace!(username = %credentials.username, step = ?step, "Scripted login");
            match step {
                LoginStep::Accept => {
                    state.current_url = Some(self.start_url.clone());
                    Ok(())
                }
                LoginStep::Reject => {
                    state.current_url = Some(self.rejected_url());
                    Ok(())
                }
                LoginStep::Fail(code) => Err(Self::scripted_failure(code)),
            }
        })
    }

    fn current_url(&self) -> BoxFuture<'_, ProviderResult<Url>> {
        Box::pin(async move {
            self.lock()
                .current_url
                .clone()
                .ok_or_else(|| ProviderError::session("no page loaded").with_provider(PROVIDER_NAME))
        })
    }

    fn refresh(&self) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(async move {
            self.lock().stats.refreshes += 1;
            Ok(())
        })
    }

    fn fetch_agenda(&self) -> BoxFuture<'_, ProviderResult<AgendaFetch>> {
        Box::pin(async move { self.next_agenda() })
    }

    fn is_session_active(&self) -> BoxFuture<'_, ProviderResult<bool>> {
        Box::pin(async move { Ok(self.lock().last_available) })
    }

    fn close(&self) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(async move {
            self.lock().stats.closes += 1;
            Ok(())
        })
    }
}
