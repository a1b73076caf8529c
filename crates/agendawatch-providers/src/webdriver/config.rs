//! WebDriver provider configuration.

use std::time::Duration;

use serde_json::{Map, Value, json};
use url::Url;

/// Configuration for the WebDriver provider.
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// WebDriver endpoint (chromedriver, geckodriver, selenium).
    pub webdriver_url: Url,

    /// Whether to run the browser without a window.
    pub headless: bool,

    /// How long to wait for the agenda widget before calling it unavailable.
    pub agenda_timeout: Duration,

    /// Pause between scrolling the submit button into view and clicking it.
    pub click_delay: Duration,

    /// Extra browser arguments appended to the defaults.
    pub extra_args: Vec<String>,
}

impl WebDriverConfig {
    /// Default WebDriver endpoint.
    pub const DEFAULT_URL: &'static str = "http://localhost:4444";

    /// Default agenda wait in seconds.
    pub const DEFAULT_AGENDA_TIMEOUT_SECS: u64 = 10;

    /// Creates a configuration for the given WebDriver endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(webdriver_url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        Ok(Self {
            webdriver_url: Url::parse(webdriver_url.as_ref())?,
            headless: true,
            agenda_timeout: Duration::from_secs(Self::DEFAULT_AGENDA_TIMEOUT_SECS),
            click_delay: Duration::from_secs(1),
            extra_args: Vec::new(),
        })
    }

    /// Builder: run with or without a visible window.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Builder: set the agenda wait.
    pub fn with_agenda_timeout(mut self, timeout: Duration) -> Self {
        self.agenda_timeout = timeout;
        self
    }

    /// Builder: append a browser argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Browser arguments: a lean, image-less Chrome.
    pub fn browser_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.headless {
            args.push("--headless=new".to_string());
        }
        args.extend(
            [
                "--disable-gpu",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--blink-settings=imagesEnabled=false",
            ]
            .map(String::from),
        );
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// W3C capabilities sent when opening the session.
    pub fn capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": self.browser_args() }),
        );
        caps
    }
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: Url::parse(Self::DEFAULT_URL).expect("default WebDriver URL is valid"),
            headless: true,
            agenda_timeout: Duration::from_secs(Self::DEFAULT_AGENDA_TIMEOUT_SECS),
            click_delay: Duration::from_secs(1),
            extra_args: Vec::new(),
        }
    }
}
