//! ContentProvider trait definition.
//!
//! A [`ContentProvider`] is the only thing that touches the observed page. It
//! can navigate, log in, and read the rendered agenda. Everything above it
//! (session handling, polling, diffing) works against this trait, so a real
//! browser and a test fixture are interchangeable.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use agendawatch_core::RawEvent;
use url::Url;

use crate::error::ProviderResult;

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe, so the watcher can hold an
/// `Arc<dyn ContentProvider>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of reading the agenda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgendaFetch {
    /// The agenda marker was found; these are the cards it contains.
    Available(Vec<RawEvent>),
    /// The agenda marker was not found, which usually means the session expired.
    Unavailable,
}

impl AgendaFetch {
    /// Returns true if the agenda was found.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Returns the events, or `None` when the agenda was unavailable.
    pub fn into_events(self) -> Option<Vec<RawEvent>> {
        match self {
            Self::Available(events) => Some(events),
            Self::Unavailable => None,
        }
    }
}

/// Login credentials for the observed site.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name typed into the login form.
    pub username: String,
    /// Account password typed into the login form.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The capability interface over the rendered page.
///
/// # Implementation Notes
///
/// - Calls are made strictly sequentially by a single task; implementations
///   need no internal locking beyond what `&self` access requires.
/// - Bounded waits (form rendering, agenda rendering) live inside the
///   implementation. Fixed settle delays are the caller's job.
/// - A missing agenda marker is reported as [`AgendaFetch::Unavailable`], not
///   as an error.
pub trait ContentProvider: Send + Sync {
    /// Returns the name of this provider (e.g. "webdriver", "fixture").
    fn name(&self) -> &str;

    /// Navigates to the given address.
    fn open<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, ProviderResult<()>>;

    /// Waits up to `form_timeout` for the login form, fills it in, and submits it.
    fn submit_credentials<'a>(
        &'a self,
        credentials: &'a Credentials,
        form_timeout: Duration,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Returns the address currently loaded.
    fn current_url(&self) -> BoxFuture<'_, ProviderResult<Url>>;

    /// Reloads the current page.
    fn refresh(&self) -> BoxFuture<'_, ProviderResult<()>>;

    /// Reads the rendered agenda.
    fn fetch_agenda(&self) -> BoxFuture<'_, ProviderResult<AgendaFetch>>;

    /// Returns true if the page currently shows an authenticated agenda.
    ///
    /// The default implementation reads the agenda; providers with a cheaper
    /// check should override it.
    fn is_session_active(&self) -> BoxFuture<'_, ProviderResult<bool>> {
        Box::pin(async move { Ok(self.fetch_agenda().await?.is_available()) })
    }

    /// Releases the underlying browser session.
    ///
    /// Called exactly once, on every exit path of the watcher.
    fn close(&self) -> BoxFuture<'_, ProviderResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agenda_fetch_accessors() {
        let available = AgendaFetch::Available(vec![RawEvent::new("09:00")]);
        assert!(available.is_available());
        assert_eq!(available.into_events().map(|e| e.len()), Some(1));

        assert!(!AgendaFetch::Unavailable.is_available());
        assert_eq!(AgendaFetch::Unavailable.into_events(), None);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("student", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("student"));
        assert!(!debug.contains("hunter2"));
    }
}
