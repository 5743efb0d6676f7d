use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::scrapers::{Browser, BrowserSession, ExtractError};

const SCROLL_HEIGHT_SCRIPT: &str = "return document.body.scrollHeight;";
const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Chrome driven through a WebDriver endpoint (chromedriver, selenium).
pub struct WebDriverBrowser {
    config: Arc<Config>,
}

impl WebDriverBrowser {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn capabilities(&self) -> Map<String, Value> {
        let mut args = vec![
            format!("--window-size={},{}", self.config.viewport.width, self.config.viewport.height),
            format!("user-agent={}", self.config.user_agent),
        ];
        if self.config.headless {
            args.push("--headless".to_string());
        }

        let mut caps = Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        caps
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ExtractError> {
        info!("Connecting to webdriver at {}", self.config.webdriver_url);

        let client = ClientBuilder::native()
            .capabilities(self.capabilities())
            .connect(&self.config.webdriver_url)
            .await
            .map_err(|e| ExtractError::Launch(e.to_string()))?;

        Ok(Box::new(WebDriverSession { client }))
    }
}

struct WebDriverSession {
    client: Client,
}

fn browser_error(e: fantoccini::error::CmdError) -> ExtractError {
    ExtractError::Browser(e.to_string())
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&mut self, url: &str) -> Result<(), ExtractError> {
        self.client
            .goto(url)
            .await
            .map_err(|e| ExtractError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    async fn page_height(&mut self) -> Result<u64, ExtractError> {
        let value = self
            .client
            .execute(SCROLL_HEIGHT_SCRIPT, vec![])
            .await
            .map_err(browser_error)?;

        value
            .as_u64()
            .or_else(|| value.as_f64().map(|h| h.max(0.0) as u64))
            .ok_or_else(|| ExtractError::Browser(format!("unexpected scrollHeight value: {}", value)))
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), ExtractError> {
        self.client
            .execute(SCROLL_TO_BOTTOM_SCRIPT, vec![])
            .await
            .map_err(browser_error)?;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, ExtractError> {
        self.client.source().await.map_err(browser_error)
    }

    async fn close(self: Box<Self>) -> Result<(), ExtractError> {
        let WebDriverSession { client } = *self;
        client.close().await.map_err(browser_error)
    }
}
