use async_trait::async_trait;
use thiserror::Error;

mod steam;
mod webdriver;

#[cfg(test)]
pub mod fake;

pub use steam::{parse_listing, scroll_until_stable, SteamListingExtractor};
pub use webdriver::WebDriverBrowser;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to start browser session: {0}")]
    Launch(String),
    #[error("failed to load {url}: {message}")]
    Navigation { url: String, message: String },
    #[error("browser command failed: {0}")]
    Browser(String),
    #[error("page height still growing after {0} scrolls")]
    ScrollLimit(u32),
    #[error("invalid review pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Starts scripted browser sessions.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ExtractError>;
}

/// One open browser window.
#[async_trait]
pub trait BrowserSession: Send {
    async fn goto(&mut self, url: &str) -> Result<(), ExtractError>;
    async fn page_height(&mut self) -> Result<u64, ExtractError>;
    async fn scroll_to_bottom(&mut self) -> Result<(), ExtractError>;
    async fn page_source(&mut self) -> Result<String, ExtractError>;
    async fn close(self: Box<Self>) -> Result<(), ExtractError>;
}
