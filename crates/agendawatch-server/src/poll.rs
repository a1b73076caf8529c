//! The watch loop: baseline, refresh, diff, notify.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, error, info, warn};

use agendawatch_core::{EventSet, diff, message};
use agendawatch_providers::ContentProvider;

use crate::error::{ServerError, ServerResult};
use crate::notify::Notifier;
use crate::session::{SessionConfig, SessionManager, SessionState};
use crate::signals::ShutdownHandle;

/// Poll cadence.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Sleep between cycles.
    pub check_interval: Duration,
    /// Settle delay after each refresh.
    pub page_load_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(180))
    }
}

impl PollConfig {
    pub const DEFAULT_PAGE_LOAD_WAIT: Duration = Duration::from_secs(15);

    /// Creates a config with the given interval.
    pub fn new(check_interval: Duration) -> Self {
        Self {
            check_interval,
            page_load_wait: Self::DEFAULT_PAGE_LOAD_WAIT,
        }
    }

    /// Builder: set the post-refresh settle delay.
    pub fn with_page_load_wait(mut self, wait: Duration) -> Self {
        self.page_load_wait = wait;
        self
    }
}

/// What one poll cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleReport {
    /// The session was lost and re-login failed; the baseline is untouched.
    Skipped,
    /// The agenda was read and compared with the baseline.
    Compared {
        added: usize,
        removed: usize,
        total: usize,
    },
}

impl CycleReport {
    /// Returns true if anything was added or removed.
    pub fn has_changes(&self) -> bool {
        matches!(self, Self::Compared { added, removed, .. } if added + removed > 0)
    }
}

/// Watches the agenda and reports changes until stopped.
pub struct PollLoop {
    provider: Arc<dyn ContentProvider>,
    notifier: Arc<dyn Notifier>,
    session: SessionManager,
    config: PollConfig,
    shutdown: ShutdownHandle,
    baseline: EventSet,
}

impl PollLoop {
    /// Creates a loop over `provider`, reporting through `notifier`.
    pub fn new(
        provider: Arc<dyn ContentProvider>,
        notifier: Arc<dyn Notifier>,
        session_config: SessionConfig,
        config: PollConfig,
        shutdown: ShutdownHandle,
    ) -> Self {
        let session = SessionManager::new(provider.clone(), session_config, shutdown.clone());
        Self {
            provider,
            notifier,
            session,
            config,
            shutdown,
            baseline: EventSet::new(),
        }
    }

    /// Events seen by the last successful read.
    pub fn baseline(&self) -> &EventSet {
        &self.baseline
    }

    /// Current session state.
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Runs until interrupted or a fatal error.
    ///
    /// An interrupt sends the stopped message and returns `Ok(())`. Startup
    /// failures return their error without a notification; any other error
    /// sends the crash message first. The provider is closed exactly once
    /// on every path.
    pub async fn run(mut self) -> ServerResult<()> {
        info!(
            provider = self.provider.name(),
            notifier = self.notifier.name(),
            interval_secs = self.config.check_interval.as_secs(),
            "Watcher starting"
        );

        let result = match self.drive().await {
            Ok(never) => match never {},
            Err(ServerError::Interrupted) => {
                info!("Stopped by operator");
                self.notify(message::STOPPED_MANUALLY).await;
                Ok(())
            }
            Err(e) if e.is_startup_failure() => {
                error!(error = %e, "Watcher could not start");
                Err(e)
            }
            Err(e) => {
                error!(error = %e, "Watcher crashed");
                self.notify(message::CRASHED).await;
                Err(e)
            }
        };

        self.close().await;
        result
    }

    async fn drive(&mut self) -> ServerResult<std::convert::Infallible> {
        self.start().await?;
        loop {
            self.cycle().await?;
            debug!(
                delay_secs = self.config.check_interval.as_secs(),
                "Waiting for next check"
            );
            self.shutdown.sleep(self.config.check_interval).await?;
        }
    }

    /// Logs in, records the baseline and sends the startup summary.
    pub async fn start(&mut self) -> ServerResult<()> {
        let baseline = self.establish().await?;

        info!(count = baseline.len(), "Baseline established");
        for key in &baseline {
            info!(event = %key, "Current event");
        }
        self.notify(&message::baseline_summary(&baseline)).await;

        self.baseline = baseline;
        Ok(())
    }

    /// Runs one refresh, read, compare and notify step.
    ///
    /// A missing agenda is treated as an expired session: one re-login is
    /// tried and the read repeated. If re-login fails the cycle is skipped.
    /// If the agenda is still missing afterwards it counts as empty.
    pub async fn cycle(&mut self) -> ServerResult<CycleReport> {
        info!(at = %Local::now().format("%H:%M"), "Checking agenda");

        self.shutdown.guard(self.provider.refresh()).await??;
        self.shutdown.sleep(self.config.page_load_wait).await?;

        let current = match self.fetch().await? {
            Some(events) => events,
            None => {
                warn!("Agenda not found, session probably expired");
                self.session.mark_expired();
                if !self.session.login().await? {
                    warn!("Re-login failed, skipping this check");
                    return Ok(CycleReport::Skipped);
                }
                match self.fetch().await? {
                    Some(events) => events,
                    None => {
                        warn!("Agenda still missing after re-login, treating as empty");
                        EventSet::new()
                    }
                }
            }
        };

        let changes = diff(&self.baseline, &current);
        for key in &changes.added {
            info!(event = %key, "New event");
            self.notify(&message::event_added(key)).await;
        }
        for key in &changes.removed {
            info!(event = %key, "Event removed");
            self.notify(&message::event_removed(key)).await;
        }
        if changes.is_empty() {
            info!(total = current.len(), "No changes");
        }

        let report = CycleReport::Compared {
            added: changes.added.len(),
            removed: changes.removed.len(),
            total: current.len(),
        };
        self.baseline = current;
        Ok(report)
    }

    /// Logs in and reads the agenda once without notifying.
    ///
    /// Closes the provider before returning.
    pub async fn check_once(mut self) -> ServerResult<EventSet> {
        let result = self.read_once().await;
        self.close().await;
        result
    }

    async fn read_once(&mut self) -> ServerResult<EventSet> {
        let events = self.establish().await?;
        let active = self.session.probe().await?;
        debug!(active, count = events.len(), "Agenda read");
        Ok(events)
    }

    async fn establish(&mut self) -> ServerResult<EventSet> {
        if !self.session.login().await? {
            return Err(ServerError::login_failed(self.session.config().max_attempts));
        }
        self.fetch().await?.ok_or(ServerError::BaselineUnavailable)
    }

    async fn fetch(&self) -> ServerResult<Option<EventSet>> {
        let fetched = self.shutdown.guard(self.provider.fetch_agenda()).await??;
        Ok(fetched
            .into_events()
            .map(|events| EventSet::from_raw(&events)))
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.send(text).await {
            warn!(notifier = self.notifier.name(), error = %e, "Failed to deliver notification");
        }
    }

    async fn close(&self) {
        if let Err(e) = self.provider.close().await {
            warn!(error = %e, "Failed to close provider");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agendawatch_core::RawEvent;
    use agendawatch_providers::{
        AgendaStep, Credentials, FixtureProvider, LoginStep, ProviderErrorCode,
    };
    use url::Url;

    use crate::notify::MemoryNotifier;

    fn start_url() -> Url {
        Url::parse("https://platform.example.org/").unwrap()
    }

    fn standup() -> RawEvent {
        RawEvent::new("10:00").with_end("10:15").with_title("Standup")
    }

    fn review() -> RawEvent {
        RawEvent::new("14:00")
            .with_end("15:00")
            .with_title("Code review")
            .with_mandatory(true)
    }

    struct Harness {
        fixture: Arc<FixtureProvider>,
        notifier: MemoryNotifier,
        shutdown: ShutdownHandle,
    }

    impl Harness {
        /// Stops the loop once the agenda script runs out.
        fn new(logins: Vec<LoginStep>, agendas: Vec<AgendaStep>) -> Self {
            let shutdown = ShutdownHandle::new();
            let stopper = shutdown.clone();
            let fixture = Arc::new(
                FixtureProvider::new(start_url())
                    .with_logins(logins)
                    .with_agendas(agendas)
                    .with_exhausted_hook(move || stopper.trigger()),
            );
            Self {
                fixture,
                notifier: MemoryNotifier::new(),
                shutdown,
            }
        }

        fn with_notifier(mut self, notifier: MemoryNotifier) -> Self {
            self.notifier = notifier;
            self
        }

        fn poll_loop(&self) -> PollLoop {
            let session = SessionConfig::new(start_url(), Credentials::new("student", "secret"));
            PollLoop::new(
                self.fixture.clone(),
                Arc::new(self.notifier.clone()),
                session,
                PollConfig::default(),
                self.shutdown.clone(),
            )
        }
    }

    #[tokio::test(start_paused = true)]
    async fn empty_start_then_new_event() {
        let harness = Harness::new(
            vec![],
            vec![
                AgendaStep::Events(vec![]),
                AgendaStep::Events(vec![standup()]),
            ],
        );

        harness.poll_loop().run().await.unwrap();

        assert_eq!(
            harness.notifier.messages(),
            vec![
                message::NO_EVENTS.to_string(),
                "[NEW EVENT] 10:00–10:15 | Standup".to_string(),
                message::STOPPED_MANUALLY.to_string(),
            ]
        );
        assert_eq!(harness.fixture.stats().closes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn summary_lists_baseline() {
        let harness = Harness::new(vec![], vec![AgendaStep::Events(vec![review(), standup()])]);

        harness.poll_loop().run().await.unwrap();

        let messages = harness.notifier.messages();
        assert_eq!(
            messages[0],
            "📋 Current events:\n\
             • 10:00–10:15 | Standup\n\
             • 14:00–15:00 | Code review (mandatory)"
        );
        assert_eq!(messages.last().unwrap(), message::STOPPED_MANUALLY);
    }

    #[tokio::test(start_paused = true)]
    async fn removal_reported() {
        let harness = Harness::new(
            vec![],
            vec![
                AgendaStep::Events(vec![standup(), review()]),
                AgendaStep::Events(vec![review()]),
            ],
        );

        harness.poll_loop().run().await.unwrap();

        let messages = harness.notifier.messages();
        assert_eq!(messages[1], "[EVENT REMOVED] 10:00–10:15 | Standup");
        assert_eq!(messages.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_agenda_sends_nothing() {
        let harness = Harness::new(
            vec![],
            vec![
                AgendaStep::Events(vec![standup()]),
                AgendaStep::Events(vec![standup()]),
                AgendaStep::Events(vec![standup()]),
            ],
        );

        harness.poll_loop().run().await.unwrap();

        assert_eq!(harness.notifier.messages().len(), 2);
        assert!(harness.fixture.stats().refreshes >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_session_relogs_and_diffs() {
        let harness = Harness::new(
            vec![],
            vec![
                AgendaStep::Events(vec![standup()]),
                AgendaStep::Unavailable,
                AgendaStep::Events(vec![standup(), review()]),
            ],
        );

        harness.poll_loop().run().await.unwrap();

        assert_eq!(
            harness.notifier.messages(),
            vec![
                message::baseline_summary(&EventSet::from_raw(&[standup()])),
                "[NEW EVENT] 14:00–15:00 | Code review (mandatory)".to_string(),
                message::STOPPED_MANUALLY.to_string(),
            ]
        );
        assert_eq!(harness.fixture.stats().login_attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_relogin_skips_cycle() {
        let harness = Harness::new(
            vec![
                LoginStep::Accept,
                LoginStep::Reject,
                LoginStep::Reject,
                LoginStep::Reject,
            ],
            vec![
                AgendaStep::Events(vec![standup()]),
                AgendaStep::Unavailable,
            ],
        );
        let mut poll = harness.poll_loop();

        poll.start().await.unwrap();
        let report = poll.cycle().await.unwrap();

        assert_eq!(report, CycleReport::Skipped);
        assert!(!report.has_changes());
        assert_eq!(poll.baseline(), &EventSet::from_raw(&[standup()]));
        assert_eq!(poll.session_state(), SessionState::LoggedOut);
        assert_eq!(harness.notifier.messages().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_agenda_after_relogin_counts_as_empty() {
        let harness = Harness::new(
            vec![],
            vec![
                AgendaStep::Events(vec![standup()]),
                AgendaStep::Unavailable,
                AgendaStep::Unavailable,
            ],
        );
        let mut poll = harness.poll_loop();

        poll.start().await.unwrap();
        let report = poll.cycle().await.unwrap();

        assert_eq!(
            report,
            CycleReport::Compared {
                added: 0,
                removed: 1,
                total: 0
            }
        );
        assert!(report.has_changes());
        assert!(poll.baseline().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn login_failure_at_startup_is_silent() {
        let harness = Harness::new(
            vec![LoginStep::Reject, LoginStep::Reject, LoginStep::Reject],
            vec![AgendaStep::Events(vec![standup()])],
        );

        let err = harness.poll_loop().run().await.unwrap_err();

        assert!(matches!(err, ServerError::LoginFailed { attempts: 3 }));
        assert!(harness.notifier.messages().is_empty());
        assert_eq!(harness.fixture.stats().closes, 1);
        assert_eq!(harness.fixture.stats().agenda_reads, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_baseline_is_silent() {
        let harness = Harness::new(vec![], vec![AgendaStep::Unavailable]);

        let err = harness.poll_loop().run().await.unwrap_err();

        assert!(matches!(err, ServerError::BaselineUnavailable));
        assert!(harness.notifier.messages().is_empty());
        assert_eq!(harness.fixture.stats().closes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn provider_error_mid_loop_reports_crash() {
        let harness = Harness::new(
            vec![],
            vec![
                AgendaStep::Events(vec![standup()]),
                AgendaStep::Fail(ProviderErrorCode::Navigation),
            ],
        );

        let err = harness.poll_loop().run().await.unwrap_err();

        assert!(matches!(err, ServerError::Provider(_)));
        assert!(!err.is_startup_failure());
        assert_eq!(
            harness.notifier.messages().last().map(String::as_str),
            Some(message::CRASHED)
        );
        assert_eq!(harness.fixture.stats().closes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_before_start_still_closes() {
        let harness = Harness::new(vec![], vec![AgendaStep::Events(vec![standup()])]);
        harness.shutdown.trigger();

        harness.poll_loop().run().await.unwrap();

        assert_eq!(
            harness.notifier.messages(),
            vec![message::STOPPED_MANUALLY.to_string()]
        );
        assert_eq!(harness.fixture.stats().login_attempts, 0);
        assert_eq!(harness.fixture.stats().closes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_during_interval_sleep() {
        let harness = Harness::new(
            vec![],
            vec![
                AgendaStep::Events(vec![standup()]),
                AgendaStep::Events(vec![standup()]),
                AgendaStep::Events(vec![standup()]),
            ],
        );
        let stopper = harness.shutdown.clone();
        tokio::spawn(async move {
            // login settle (20s) + first cycle (15s) + part of the interval
            tokio::time::sleep(Duration::from_secs(60)).await;
            stopper.trigger();
        });

        let started = tokio::time::Instant::now();
        harness.poll_loop().run().await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(180));
        assert_eq!(harness.fixture.stats().refreshes, 1);
        assert_eq!(
            harness.notifier.messages().last().map(String::as_str),
            Some(message::STOPPED_MANUALLY)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn notifier_failures_do_not_stop_the_loop() {
        let harness = Harness::new(
            vec![],
            vec![
                AgendaStep::Events(vec![]),
                AgendaStep::Events(vec![standup()]),
            ],
        )
        .with_notifier(MemoryNotifier::failing());

        harness.poll_loop().run().await.unwrap();

        assert_eq!(harness.notifier.messages().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn check_once_reads_without_notifying() {
        let harness = Harness::new(vec![], vec![AgendaStep::Events(vec![standup(), review()])]);

        let events = harness.poll_loop().check_once().await.unwrap();

        assert_eq!(events.len(), 2);
        assert!(harness.notifier.messages().is_empty());
        assert_eq!(harness.fixture.stats().closes, 1);
    }
}
