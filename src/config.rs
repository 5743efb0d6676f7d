use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "game_scout";
const ENV_PREFIX: &str = "GAME_SCOUT";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub target_url: String,
    pub webdriver_url: String,
    pub database_path: String,
    pub user_agent: String,
    pub viewport: Viewport,
    pub headless: bool,
    /// Pause after each scroll before the page height is measured again.
    pub scroll_settle_ms: u64,
    /// Upper bound on scrolls before the page is parsed as-is.
    pub max_scrolls: u32,
    /// Pause after every status event so observers get a chance to deliver it.
    pub status_yield_ms: u64,
    /// Word following the review count inside the review tooltip.
    pub review_count_word: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            target_url: "https://store.steampowered.com/search/?filter=topsellers&ignore_preferences=1".to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            database_path: "game_scout.db".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36".to_string(),
            viewport: Viewport {
                width: 1920,
                height: 1080,
            },
            headless: true,
            scroll_settle_ms: 2000,
            max_scrolls: 200,
            status_yield_ms: 100,
            review_count_word: "análises".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the optional config file, then `GAME_SCOUT__*` environment variables.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())
            .context("Failed to build default configuration")?;

        let file = match path {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: Config = config::Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.target_url)
            .with_context(|| format!("Invalid target_url: {}", self.target_url))?;
        Url::parse(&self.webdriver_url)
            .with_context(|| format!("Invalid webdriver_url: {}", self.webdriver_url))?;

        if self.viewport.width == 0 || self.viewport.height == 0 {
            bail!(
                "Viewport must be non-empty, got {}x{}",
                self.viewport.width,
                self.viewport.height
            );
        }
        if self.review_count_word.trim().is_empty() {
            bail!("review_count_word must not be empty");
        }
        Ok(())
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn status_yield(&self) -> Duration {
        Duration::from_millis(self.status_yield_ms)
    }
}

#[cfg(test)]
impl Config {
    /// Defaults with every pause disabled, for tests driving fake browsers.
    pub fn for_tests(database_path: &str) -> Self {
        Config {
            database_path: database_path.to_string(),
            scroll_settle_ms: 0,
            status_yield_ms: 0,
            max_scrolls: 10,
            ..Config::default()
        }
    }
}
