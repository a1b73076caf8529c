//! WebDriver-backed content provider.

use std::time::Duration;

use fantoccini::elements::Element;
use fantoccini::error::{CmdError, NewSessionError};
use fantoccini::{Client, ClientBuilder, Locator};
use tracing::{debug, info, trace};
use url::Url;

use agendawatch_core::RawEvent;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{AgendaFetch, BoxFuture, ContentProvider, Credentials};

use super::config::WebDriverConfig;
use super::selectors;

const PROVIDER_NAME: &str = "webdriver";

/// Reads the agenda through a real browser driven over WebDriver.
///
/// One browser session is opened by [`WebDriverProvider::connect`] and reused
/// for the whole process lifetime.
pub struct WebDriverProvider {
    client: Client,
    config: WebDriverConfig,
}

impl WebDriverProvider {
    /// Opens a browser session on the configured WebDriver endpoint.
    pub async fn connect(config: WebDriverConfig) -> ProviderResult<Self> {
        info!(url = %config.webdriver_url, headless = config.headless, "Connecting to WebDriver");

        let client = ClientBuilder::native()
            .capabilities(config.capabilities())
            .connect(config.webdriver_url.as_str())
            .await
            .map_err(|e| session_error(&config.webdriver_url, e))?;

        Ok(Self { client, config })
    }

    async fn login(&self, credentials: &Credentials, form_timeout: Duration) -> ProviderResult<()> {
        let username = self
            .client
            .wait()
            .at_most(form_timeout)
            .for_element(Locator::Css(selectors::USERNAME_FIELD))
            .await
            .map_err(|e| cmd_error("login form did not render", e))?;
        username
            .clear()
            .await
            .map_err(|e| cmd_error("failed to clear username", e))?;
        username
            .send_keys(&credentials.username)
            .await
            .map_err(|e| cmd_error("failed to type username", e))?;

        let password = self
            .client
            .find(Locator::Css(selectors::PASSWORD_FIELD))
            .await
            .map_err(|e| cmd_error("password field not found", e))?;
        password
            .clear()
            .await
            .map_err(|e| cmd_error("failed to clear password", e))?;
        password
            .send_keys(&credentials.password)
            .await
            .map_err(|e| cmd_error("failed to type password", e))?;

        let submit = self
            .client
            .wait()
            .at_most(form_timeout)
            .for_element(Locator::Css(selectors::SUBMIT_BUTTON))
            .await
            .map_err(|e| cmd_error("submit button did not render", e))?;
        self.scroll_into_view(&submit).await?;
        tokio::time::sleep(self.config.click_delay).await;
        submit
            .click()
            .await
            .map_err(|e| cmd_error("failed to click submit", e))?;

        debug!("Login form submitted");
        Ok(())
    }

    async fn scroll_into_view(&self, element: &Element) -> ProviderResult<()> {
        let arg = serde_json::to_value(element).map_err(|e| {
            ProviderError::internal("failed to serialize element reference")
                .with_provider(PROVIDER_NAME)
                .with_source(e)
        })?;
        self.client
            .execute("arguments[0].scrollIntoView(true);", vec![arg])
            .await
            .map_err(|e| cmd_error("failed to scroll submit button into view", e))?;
        Ok(())
    }

    async fn read_agenda(&self) -> ProviderResult<AgendaFetch> {
        let widget = match self
            .client
            .wait()
            .at_most(self.config.agenda_timeout)
            .for_element(Locator::Css(selectors::AGENDA_WIDGET))
            .await
        {
            Ok(widget) => widget,
            Err(e) => {
                debug!(error = %e, "Agenda widget not found");
                return Ok(AgendaFetch::Unavailable);
            }
        };

        let cards = widget
            .find_all(Locator::Css(selectors::EVENT_CARD))
            .await
            .map_err(|e| cmd_error("failed to list agenda cards", e))?;

        let mut events = Vec::with_capacity(cards.len());
        for card in &cards {
            events.push(read_card(card).await?);
        }

        trace!(count = events.len(), "Read agenda cards");
        Ok(AgendaFetch::Available(events))
    }
}

async fn read_card(card: &Element) -> ProviderResult<RawEvent> {
    let time_start = card
        .find(Locator::Css(selectors::TIME_START))
        .await
        .map_err(|e| cmd_error("agenda card has no start time", e))?
        .text()
        .await
        .map_err(|e| cmd_error("failed to read start time", e))?;

    let mandatory = card
        .find_all(Locator::Css(selectors::MANDATORY_BADGE))
        .await
        .map_err(|e| cmd_error("failed to look up mandatory badge", e))?;

    Ok(RawEvent {
        time_start: time_start.trim().to_string(),
        time_end: optional_text(card, selectors::TIME_END).await?,
        title: optional_text(card, selectors::TITLE).await?,
        description: optional_text(card, selectors::DESCRIPTION).await?,
        is_mandatory: !mandatory.is_empty(),
    })
}

/// Text of the first match, or `None` when the card lacks that element.
async fn optional_text(card: &Element, selector: &str) -> ProviderResult<Option<String>> {
    let found = card
        .find_all(Locator::Css(selector))
        .await
        .map_err(|e| cmd_error("failed to query agenda card", e))?;

    match found.first() {
        Some(element) => {
            let text = element
                .text()
                .await
                .map_err(|e| cmd_error("failed to read agenda card text", e))?;
            Ok(Some(text.trim().to_string()))
        }
        None => Ok(None),
    }
}

fn cmd_error(context: &str, err: CmdError) -> ProviderError {
    let base = match &err {
        CmdError::WaitTimeout => ProviderError::timeout(context),
        e if e.is_no_such_element() => ProviderError::element_not_found(context),
        _ => ProviderError::navigation(context),
    };
    base.with_provider(PROVIDER_NAME).with_source(err)
}

fn session_error(url: &Url, err: NewSessionError) -> ProviderError {
    ProviderError::session(format!("failed to open browser session at {}", url))
        .with_provider(PROVIDER_NAME)
        .with_source(err)
}

impl ContentProvider for WebDriverProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn open<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            debug!(url = %url, "Navigating");
            self.client
                .goto(url.as_str())
                .await
                .map_err(|e| cmd_error("navigation failed", e))
        })
    }

    fn submit_credentials<'a>(
        &'a self,
        credentials: &'a Credentials,
        form_timeout: Duration,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.login(credentials, form_timeout))
    }

    fn current_url(&self) -> BoxFuture<'_, ProviderResult<Url>> {
        Box::pin(async move {
            self.client
                .current_url()
                .await
                .map_err(|e| cmd_error("failed to read current address", e))
        })
    }

    fn refresh(&self) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(async move {
            self.client
                .refresh()
                .await
                .map_err(|e| cmd_error("page refresh failed", e))
        })
    }

    fn fetch_agenda(&self) -> BoxFuture<'_, ProviderResult<AgendaFetch>> {
        Box::pin(self.read_agenda())
    }

    fn is_session_active(&self) -> BoxFuture<'_, ProviderResult<bool>> {
        Box::pin(async move {
            let widgets = self
                .client
                .find_all(Locator::Css(selectors::AGENDA_WIDGET))
                .await
                .map_err(|e| cmd_error("failed to look up agenda widget", e))?;
            Ok(!widgets.is_empty())
        })
    }

    fn close(&self) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(async move {
            info!("Closing browser session");
            self.client
                .clone()
                .close()
                .await
                .map_err(|e| cmd_error("failed to close browser session", e))
        })
    }
}
