//! Loading the watcher configuration from the client side.
//!
//! The file format and defaults live in [`agendawatch_server::AppConfig`];
//! this module adds secret resolution and the browser settings.

use std::path::Path;

use agendawatch_providers::webdriver::WebDriverConfig;
use agendawatch_server::AppConfig;

use crate::error::ClientResult;
use crate::secret;

/// Loads `path` and resolves `env::`/`pass::` references in credentials.
pub fn load(path: &Path) -> ClientResult<AppConfig> {
    let config = AppConfig::load(path)?.resolve_secrets(secret::resolve)?;
    Ok(config)
}

/// Browser settings derived from the watcher configuration.
pub fn webdriver_config(config: &AppConfig) -> WebDriverConfig {
    WebDriverConfig {
        webdriver_url: config.webdriver_url.clone(),
        headless: config.headless,
        ..WebDriverConfig::default()
    }
}

/// `KEY=value` lines describing `config`, secrets redacted.
pub fn redacted_lines(config: &AppConfig) -> Vec<String> {
    let redact = |value: &str| if value.is_empty() { "" } else { "<redacted>" };
    vec![
        format!("USERNAME={}", config.username),
        format!("PASSWORD={}", redact(&config.password)),
        format!("BOT_TOKEN={}", redact(&config.bot_token)),
        format!("USER_ID={}", config.user_id),
        format!("CHECK_INTERVAL={}", config.check_interval.as_secs()),
        format!("PAGE_LOAD_WAIT={}", config.page_load_wait.as_secs()),
        format!("START_URL={}", config.start_url),
        format!("WEBDRIVER_URL={}", config.webdriver_url),
        format!("HEADLESS={}", config.headless),
        format!("TELEGRAM_API_URL={}", config.telegram_api_url),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::error::ClientError;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_resolves_env_references() {
        unsafe {
            std::env::set_var("_AGENDAWATCH_TEST_PASSWORD", "from-env");
        }
        let file = write_config(
            "USERNAME=student\nPASSWORD=env::_AGENDAWATCH_TEST_PASSWORD\nBOT_TOKEN=1:a\nUSER_ID=7\n",
        );

        let config = load(file.path()).unwrap();
        assert_eq!(config.password, "from-env");

        unsafe {
            std::env::remove_var("_AGENDAWATCH_TEST_PASSWORD");
        }
    }

    #[test]
    fn load_reports_unresolvable_secret() {
        let file = write_config(
            "USERNAME=student\nPASSWORD=hunter2\nBOT_TOKEN=env::_AGENDAWATCH_UNSET_VAR_98765\nUSER_ID=7\n",
        );

        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        assert!(err.to_string().contains("BOT_TOKEN"));
    }

    #[test]
    fn load_rejects_chat_id_from_password_store() {
        let file = write_config(
            "USERNAME=student\nPASSWORD=hunter2\nBOT_TOKEN=1:a\nUSER_ID=pass::telegram/chat\n",
        );

        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        assert!(err.to_string().contains("USER_ID"));
    }

    #[test]
    fn webdriver_settings_follow_config() {
        let file = write_config(
            "USERNAME=a\nPASSWORD=b\nBOT_TOKEN=c\nUSER_ID=d\nHEADLESS=false\nWEBDRIVER_URL=http://grid:4444\n",
        );
        let config = load(file.path()).unwrap();

        let webdriver = webdriver_config(&config);
        assert!(!webdriver.headless);
        assert_eq!(webdriver.webdriver_url.as_str(), "http://grid:4444/");
    }

    #[test]
    fn redacted_lines_hide_secrets() {
        let file = write_config("USERNAME=a\nPASSWORD=hunter2\nBOT_TOKEN=1:secret\nUSER_ID=d\n");
        let config = load(file.path()).unwrap();

        let dump = redacted_lines(&config).join("\n");
        assert!(dump.contains("PASSWORD=<redacted>"));
        assert!(!dump.contains("hunter2"));
        assert!(!dump.contains("1:secret"));
        assert!(dump.contains("CHECK_INTERVAL=180"));
    }
}
