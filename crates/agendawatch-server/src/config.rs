//! Watcher configuration.
//!
//! The config file is plain `KEY=value` lines:
//!
//! ```text
//! # platform account
//! USERNAME=student
//! PASSWORD=env::PLATFORM_PASSWORD
//! BOT_TOKEN=123456:ABC
//! USER_ID=987654321
//! CHECK_INTERVAL=180
//! ```
//!
//! Blank lines, `#` comments and lines without `=` are ignored. The first `=`
//! splits key from value; both are trimmed.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use agendawatch_providers::Credentials;

use crate::notify::TelegramConfig;
use crate::poll::PollConfig;
use crate::session::SessionConfig;

/// Keys that must be present and non-empty.
pub const REQUIRED_KEYS: [&str; 4] = ["USERNAME", "PASSWORD", "BOT_TOKEN", "USER_ID"];

/// Keys whose values may be secret references.
const SECRET_KEYS: [&str; 4] = REQUIRED_KEYS;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required key is absent or empty.
    #[error("missing required key `{key}`")]
    Missing { key: String },

    /// A key has a value that cannot be used.
    #[error("invalid value `{value}` for `{key}`: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    /// A secret reference could not be resolved.
    #[error("failed to resolve secret for `{key}`: {message}")]
    Secret { key: String, message: String },
}

impl ConfigError {
    /// Creates a missing-key error.
    pub fn missing(key: impl Into<String>) -> Self {
        Self::Missing { key: key.into() }
    }

    /// Creates an invalid-value error.
    pub fn invalid(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Immutable process configuration, loaded once at startup.
#[derive(Clone)]
pub struct AppConfig {
    /// Platform account name.
    pub username: String,
    /// Platform account password.
    pub password: String,
    /// Telegram bot token.
    pub bot_token: String,
    /// Telegram chat that receives notifications.
    pub user_id: String,
    /// Time between poll cycles.
    pub check_interval: Duration,
    /// Settle delay after each page refresh.
    pub page_load_wait: Duration,
    /// Address a successful login lands on.
    pub start_url: Url,
    /// WebDriver endpoint.
    pub webdriver_url: Url,
    /// Whether the browser runs headless.
    pub headless: bool,
    /// Telegram Bot API base address.
    pub telegram_api_url: Url,
}

impl AppConfig {
    /// Default seconds between poll cycles.
    pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 180;

    /// Default settle seconds after a refresh.
    pub const DEFAULT_PAGE_LOAD_WAIT_SECS: u64 = 15;

    /// Default start page.
    pub const DEFAULT_START_URL: &'static str = "https://platform.21-school.ru/";

    /// Default WebDriver endpoint.
    pub const DEFAULT_WEBDRIVER_URL: &'static str = "http://localhost:4444";

    /// Default Telegram Bot API base.
    pub const DEFAULT_TELEGRAM_API_URL: &'static str = "https://api.telegram.org";

    /// Loads configuration from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from `KEY=value` text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Self::from_pairs(&parse_pairs(content))
    }

    /// Builds configuration from already-split pairs.
    pub fn from_pairs(pairs: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let required = |key: &str| -> Result<String, ConfigError> {
            pairs
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| ConfigError::missing(key))
        };

        Ok(Self {
            username: required("USERNAME")?,
            password: required("PASSWORD")?,
            bot_token: required("BOT_TOKEN")?,
            user_id: required("USER_ID")?,
            check_interval: seconds(pairs, "CHECK_INTERVAL", Self::DEFAULT_CHECK_INTERVAL_SECS, false)?,
            page_load_wait: seconds(pairs, "PAGE_LOAD_WAIT", Self::DEFAULT_PAGE_LOAD_WAIT_SECS, true)?,
            start_url: url(pairs, "START_URL", Self::DEFAULT_START_URL)?,
            webdriver_url: url(pairs, "WEBDRIVER_URL", Self::DEFAULT_WEBDRIVER_URL)?,
            headless: boolean(pairs, "HEADLESS", true)?,
            telegram_api_url: url(pairs, "TELEGRAM_API_URL", Self::DEFAULT_TELEGRAM_API_URL)?,
        })
    }

    /// Rewrites credential values through `resolve`.
    ///
    /// `resolve` gets the key and its raw value. Used to expand secret
    /// references such as `env::VAR`.
    pub fn resolve_secrets<F>(mut self, resolve: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str, &str) -> Result<String, String>,
    {
        for key in SECRET_KEYS {
            let slot = match key {
                "USERNAME" => &mut self.username,
                "PASSWORD" => &mut self.password,
                "BOT_TOKEN" => &mut self.bot_token,
                _ => &mut self.user_id,
            };
            let resolved = resolve(key, slot).map_err(|message| ConfigError::Secret {
                key: key.to_string(),
                message,
            })?;
            if resolved.is_empty() {
                return Err(ConfigError::missing(key));
            }
            *slot = resolved;
        }
        Ok(self)
    }

    /// Platform credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }

    /// Login policy for the session manager.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.start_url.clone(), self.credentials())
    }

    /// Cadence for the poll loop.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig::new(self.check_interval).with_page_load_wait(self.page_load_wait)
    }

    /// Telegram notifier settings.
    pub fn telegram_config(&self) -> TelegramConfig {
        TelegramConfig::new(self.telegram_api_url.clone(), &self.bot_token, &self.user_id)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("check_interval", &self.check_interval)
            .field("page_load_wait", &self.page_load_wait)
            .field("start_url", &self.start_url.as_str())
            .field("webdriver_url", &self.webdriver_url.as_str())
            .field("headless", &self.headless)
            .field("telegram_api_url", &self.telegram_api_url.as_str())
            .finish()
    }
}

/// Splits `KEY=value` lines into a map. Later duplicates win.
pub fn parse_pairs(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

fn seconds(
    pairs: &BTreeMap<String, String>,
    key: &str,
    default: u64,
    allow_zero: bool,
) -> Result<Duration, ConfigError> {
    let Some(raw) = pairs.get(key).filter(|v| !v.is_empty()) else {
        return Ok(Duration::from_secs(default));
    };
    let secs: u64 = raw
        .parse()
        .map_err(|_| ConfigError::invalid(key, raw, "expected a whole number of seconds"))?;
    if secs == 0 && !allow_zero {
        return Err(ConfigError::invalid(key, raw, "must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

fn url(pairs: &BTreeMap<String, String>, key: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = pairs
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .unwrap_or(default);
    Url::parse(raw).map_err(|e| ConfigError::invalid(key, raw, e.to_string()))
}

fn boolean(pairs: &BTreeMap<String, String>, key: &str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = pairs.get(key).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, raw, "expected true or false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = "USERNAME=student\nPASSWORD=hunter2\nBOT_TOKEN=123:abc\nUSER_ID=42\n";

    #[test]
    fn parse_pairs_skips_comments_and_junk() {
        let pairs = parse_pairs(
            "# comment\n\n  USERNAME = student \nnot a pair\nURL=https://x.org/?a=b\n",
        );
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs["USERNAME"], "student");
        assert_eq!(pairs["URL"], "https://x.org/?a=b");
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = AppConfig::parse(MINIMAL).unwrap();
        assert_eq!(config.username, "student");
        assert_eq!(config.user_id, "42");
        assert_eq!(config.check_interval, Duration::from_secs(180));
        assert_eq!(config.page_load_wait, Duration::from_secs(15));
        assert_eq!(config.start_url.as_str(), "https://platform.21-school.ru/");
        assert_eq!(config.webdriver_url.as_str(), "http://localhost:4444/");
        assert!(config.headless);
    }

    #[test]
    fn optional_keys_override_defaults() {
        let text = format!(
            "{MINIMAL}CHECK_INTERVAL=60\nPAGE_LOAD_WAIT=0\nHEADLESS=no\nSTART_URL=https://example.org/\n"
        );
        let config = AppConfig::parse(&text).unwrap();
        assert_eq!(config.check_interval, Duration::from_secs(60));
        assert_eq!(config.page_load_wait, Duration::ZERO);
        assert!(!config.headless);
        assert_eq!(config.start_url.as_str(), "https://example.org/");
    }

    #[test]
    fn missing_key_is_named() {
        for key in REQUIRED_KEYS {
            let text: String = MINIMAL
                .lines()
                .filter(|line| !line.starts_with(key))
                .map(|line| format!("{line}\n"))
                .collect();
            let err = AppConfig::parse(&text).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Missing { key: k } if k == key),
                "expected missing {key}, got {err}"
            );
        }
    }

    #[test]
    fn empty_required_value_counts_as_missing() {
        let text = MINIMAL.replace("BOT_TOKEN=123:abc", "BOT_TOKEN=");
        let err = AppConfig::parse(&text).unwrap_err();
        assert!(err.to_string().contains("BOT_TOKEN"));
    }

    #[test]
    fn invalid_interval_is_rejected() {
        let err = AppConfig::parse(&format!("{MINIMAL}CHECK_INTERVAL=soon\n")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "CHECK_INTERVAL"));

        let err = AppConfig::parse(&format!("{MINIMAL}CHECK_INTERVAL=0\n")).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = AppConfig::parse(&format!("{MINIMAL}WEBDRIVER_URL=nope\n")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "WEBDRIVER_URL"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AppConfig::parse(MINIMAL).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("123:abc"));
        assert!(debug.contains("student"));
    }

    #[test]
    fn resolve_secrets_rewrites_credentials() {
        let config = AppConfig::parse(MINIMAL)
            .unwrap()
            .resolve_secrets(|_, v| Ok(v.to_uppercase()))
            .unwrap();
        assert_eq!(config.username, "STUDENT");
        assert_eq!(config.password, "HUNTER2");
        assert_eq!(config.user_id, "42");
    }

    #[test]
    fn resolve_secrets_reports_key() {
        let err = AppConfig::parse(MINIMAL)
            .unwrap()
            .resolve_secrets(|key, v| {
                if key == "PASSWORD" {
                    Err("vault locked".to_string())
                } else {
                    Ok(v.to_string())
                }
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::Secret { ref key, .. } if key == "PASSWORD"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{MINIMAL}CHECK_INTERVAL=30\n").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.check_interval, Duration::from_secs(30));
    }

    #[test]
    fn load_missing_file_fails() {
        let err = AppConfig::load("/nonexistent/agendawatch/config.txt").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn derived_configs() {
        let config = AppConfig::parse(MINIMAL).unwrap();
        assert_eq!(config.credentials().username, "student");
        assert_eq!(config.session_config().start_url, config.start_url);
        assert_eq!(config.poll_config().check_interval, Duration::from_secs(180));
        assert_eq!(config.telegram_config().chat_id, "42");
    }
}
