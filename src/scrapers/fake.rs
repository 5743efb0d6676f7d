use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::scrapers::{Browser, BrowserSession, ExtractError};

/// Search results page with three titled rows and one untitled row.
pub const SAMPLE_LISTING: &str = r#"
    <html><body><div id="search_resultsRows">
      <a class="search_result_row" href="/app/1">
        <span class="title">Game A</span>
        <span class="search_review_summary positive"
              data-tooltip-html="Muito positivas&lt;br&gt;85% das 1,200 análises de usuários deste jogo são positivas."></span>
        <div class="search_price_discount_combined">
          <div class="search_price">R$ 99,90R$ 59,90</div>
          <div class="discount_final_price">R$ 59,90</div>
        </div>
      </a>
      <a class="search_result_row" href="/app/2">
        <span class="title">  Big   Bundle </span>
        <div class="search_price">R$ 1.234,56</div>
      </a>
      <a class="search_result_row" href="/app/3">
        <div class="search_price">R$ 10,00</div>
      </a>
      <a class="search_result_row" href="/app/4">
        <span class="title">Free Game</span>
        <span class="search_review_summary" data-tooltip-html="Positivas"></span>
      </a>
    </div></body></html>
"#;

/// Counters shared between a fake browser and the sessions it hands out.
#[derive(Clone, Default)]
pub struct FakeStats {
    launches: Arc<AtomicU32>,
    scrolls: Arc<AtomicU32>,
    closes: Arc<AtomicU32>,
}

impl FakeStats {
    pub fn launches(&self) -> u32 {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn scrolls(&self) -> u32 {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> u32 {
        self.closes.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Failure {
    None,
    Launch,
    Navigation,
}

/// Serves a fixed page with a scripted sequence of scroll heights.
#[derive(Clone)]
pub struct FakeBrowser {
    html: String,
    heights: Vec<u64>,
    grows_forever: bool,
    failure: Failure,
    stats: FakeStats,
}

impl FakeBrowser {
    pub fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
            heights: vec![1000],
            grows_forever: false,
            failure: Failure::None,
            stats: FakeStats::default(),
        }
    }

    /// Heights returned by successive measurements; the last one repeats.
    pub fn with_heights(mut self, heights: Vec<u64>) -> Self {
        self.heights = heights;
        self
    }

    pub fn growing_forever(mut self) -> Self {
        self.grows_forever = true;
        self
    }

    pub fn failing_launch(mut self) -> Self {
        self.failure = Failure::Launch;
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.failure = Failure::Navigation;
        self
    }

    pub fn stats(&self) -> FakeStats {
        self.stats.clone()
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ExtractError> {
        if self.failure == Failure::Launch {
            return Err(ExtractError::Launch("webdriver unreachable".to_string()));
        }
        self.stats.launches.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(FakeSession {
            browser: self.clone(),
            measurements: 0,
        }))
    }
}

struct FakeSession {
    browser: FakeBrowser,
    measurements: usize,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn goto(&mut self, url: &str) -> Result<(), ExtractError> {
        if self.browser.failure == Failure::Navigation {
            return Err(ExtractError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        Ok(())
    }

    async fn page_height(&mut self) -> Result<u64, ExtractError> {
        let index = self.measurements;
        self.measurements += 1;

        if self.browser.grows_forever {
            return Ok(1000 * (index as u64 + 1));
        }
        let heights = &self.browser.heights;
        Ok(heights.get(index).or(heights.last()).copied().unwrap_or(0))
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), ExtractError> {
        self.browser.stats.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String, ExtractError> {
        Ok(self.browser.html.clone())
    }

    async fn close(self: Box<Self>) -> Result<(), ExtractError> {
        self.browser.stats.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
