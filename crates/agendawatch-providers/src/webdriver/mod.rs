//! WebDriver content provider.
//!
//! Drives a Chrome session through any W3C WebDriver endpoint and reads the
//! platform's agenda widget card by card.
//!
//! # Example
//!
//! ```ignore
//! use agendawatch_providers::webdriver::{WebDriverConfig, WebDriverProvider};
//!
//! let config = WebDriverConfig::new("http://localhost:4444")?.with_headless(true);
//! let provider = WebDriverProvider::connect(config).await?;
//! let agenda = provider.fetch_agenda().await?;
//! ```

mod config;
mod provider;
pub mod selectors;

pub use config::WebDriverConfig;
pub use provider::WebDriverProvider;
