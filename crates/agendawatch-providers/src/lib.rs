//! ContentProvider trait and implementations.
//!
//! This crate is the boundary between the watcher and the observed page:
//!
//! - [`ContentProvider`] - The capability trait every page backend implements
//! - [`AgendaFetch`] - The agenda cards, or "unavailable" when the session is gone
//! - [`ProviderError`] - Error types for provider operations
//! - [`webdriver::WebDriverProvider`] - A real browser over WebDriver
//! - [`fixture::FixtureProvider`] - A scripted stand-in for tests
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐    ┌──────────────────┐
//! │  Chrome (W3C WD) │    │  Scripted steps  │
//! └────────┬─────────┘    └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌──────────────────┐    ┌──────────────────┐
//! │WebDriverProvider │    │ FixtureProvider  │
//! └────────┬─────────┘    └────────┬─────────┘
//!          │                       │
//!          │    ContentProvider    │
//!          └───────────┬───────────┘
//!                      │
//!                      ▼
//!           ┌──────────────────────┐
//!           │ AgendaFetch/RawEvent │
//!           └──────────────────────┘
//! ```

pub mod error;
pub mod fixture;
pub mod provider;
#[cfg(feature = "webdriver")]
pub mod webdriver;

// Re-export main types at crate root
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use fixture::{AgendaStep, FixtureProvider, FixtureStats, LoginStep};
pub use provider::{AgendaFetch, BoxFuture, ContentProvider, Credentials};
