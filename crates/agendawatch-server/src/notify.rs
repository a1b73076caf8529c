//! Outbound notifications.
//!
//! The watcher talks to a [`Notifier`]; production uses [`TelegramNotifier`],
//! tests and dry runs use [`MemoryNotifier`]. Delivery failures are reported
//! to the caller, which logs them and carries on.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

use agendawatch_providers::BoxFuture;

/// Result type for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors raised while talking to the notification endpoint.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request never got a response.
    #[error("request failed: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status.
    #[error("API error ({status}): {description}")]
    Status { status: u16, description: String },

    /// The endpoint answered but refused the call.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The response body could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The endpoint address could not be built.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// A scripted failure from [`MemoryNotifier`].
    #[error("delivery disabled")]
    Disabled,
}

impl NotifyError {
    fn network(err: reqwest::Error) -> Self {
        // The request URL embeds the bot token.
        let err = err.without_url();
        if err.is_timeout() {
            Self::Network("request timeout".to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {}", err))
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Delivers plain-text messages to the operator.
pub trait Notifier: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Sends one message.
    fn send<'a>(&'a self, text: &'a str) -> BoxFuture<'a, NotifyResult<()>>;
}

/// Telegram Bot API settings.
#[derive(Clone)]
pub struct TelegramConfig {
    /// API base address, without the `/bot<token>` part.
    pub api_base: Url,
    /// Bot token.
    pub bot_token: String,
    /// Recipient chat.
    pub chat_id: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl TelegramConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a config for `api_base`, e.g. `https://api.telegram.org`.
    pub fn new(api_base: Url, bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            api_base,
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Builder: set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base.as_str())
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// The bot account behind a token, as reported by `getMe`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl fmt::Display for BotIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.username {
            Some(username) => write!(f, "@{}", username),
            None => write!(f, "{}", self.first_name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends messages through the Telegram Bot API.
pub struct TelegramNotifier {
    http_client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    /// Creates a notifier. Does not contact the API.
    pub fn new(config: TelegramConfig) -> NotifyResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(NotifyError::network)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Checks the token with `getMe` and returns the bot identity.
    pub async fn verify(&self) -> NotifyResult<BotIdentity> {
        let url = self.method_url("getMe")?;
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(NotifyError::network)?;

        let identity: BotIdentity = read_result(response).await?.ok_or_else(|| {
            NotifyError::InvalidResponse("getMe returned no bot".to_string())
        })?;
        debug!(bot = %identity, "Bot token verified");
        Ok(identity)
    }

    async fn send_message(&self, text: &str) -> NotifyResult<()> {
        let url = self.method_url("sendMessage")?;
        let body = SendMessage {
            chat_id: &self.config.chat_id,
            text,
        };

        let response = self
            .http_client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(NotifyError::network)?;

        read_result::<serde_json::Value>(response).await?;
        trace!(chars = text.chars().count(), "Message delivered");
        Ok(())
    }

    fn method_url(&self, method: &str) -> NotifyResult<Url> {
        let mut url = self.config.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| NotifyError::InvalidEndpoint("API base cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(&format!("bot{}", self.config.bot_token))
            .push(method);
        Ok(url)
    }
}

/// Checks status and the `ok` flag, then returns the `result` payload.
async fn read_result<T>(response: reqwest::Response) -> NotifyResult<Option<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    let body = response.text().await.map_err(NotifyError::network)?;

    let parsed: Option<ApiResponse<T>> = serde_json::from_str(&body).ok();

    if !status.is_success() {
        let description = parsed
            .and_then(|r| r.description)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
        return Err(NotifyError::Status {
            status: status.as_u16(),
            description,
        });
    }

    let parsed = parsed.ok_or_else(|| {
        NotifyError::InvalidResponse("response is not a Bot API envelope".to_string())
    })?;
    if !parsed.ok {
        return Err(NotifyError::Rejected(
            parsed.description.unwrap_or_else(|| "no description".to_string()),
        ));
    }
    Ok(parsed.result)
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send<'a>(&'a self, text: &'a str) -> BoxFuture<'a, NotifyResult<()>> {
        Box::pin(self.send_message(text))
    }
}

/// Keeps messages in memory instead of sending them.
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    failing: bool,
}

impl MemoryNotifier {
    /// Creates a notifier that records every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier that records every message and then fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Messages sent so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for MemoryNotifier {
    fn name(&self) -> &str {
        "memory"
    }

    fn send<'a>(&'a self, text: &'a str) -> BoxFuture<'a, NotifyResult<()>> {
        Box::pin(async move {
            self.lock().push(text.to_string());
            if self.failing {
                Err(NotifyError::Disabled)
            } else {
                Ok(())
            }
        })
    }
}
