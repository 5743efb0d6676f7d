use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{RawRecord, MISSING_PRICE};
use crate::parsers::{clean_text, price_text_after_currency, ReviewTooltipParser};
use crate::pipeline::StatusReporter;
use crate::scrapers::{Browser, BrowserSession, ExtractError};

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.search_result_row").expect("Invalid row selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.title").expect("Invalid title selector"));
static DISCOUNT_PRICE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.discount_final_price").expect("Invalid discount price selector"));
static PRICE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.search_price").expect("Invalid price selector"));
static REVIEW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.search_review_summary").expect("Invalid review selector"));

const TOOLTIP_ATTR: &str = "data-tooltip-html";

/// Walks the infinite-scroll search listing and turns every result row into a `RawRecord`.
pub struct SteamListingExtractor {
    config: Arc<Config>,
    browser: Arc<dyn Browser>,
}

impl SteamListingExtractor {
    pub fn new(config: Arc<Config>, browser: Arc<dyn Browser>) -> Self {
        Self { config, browser }
    }

    pub async fn extract(&self, reporter: &StatusReporter) -> Result<Vec<RawRecord>, ExtractError> {
        let url = &self.config.target_url;
        reporter.info(format!("Starting collection from '{}'...", url)).await;

        let tooltip_parser = ReviewTooltipParser::new(&self.config.review_count_word)?;

        let mut session = self.browser.launch().await?;
        reporter.info("Browser started. Loading the page...").await;

        let loaded = self.load_full_page(session.as_mut(), reporter).await;

        // The session is closed whether or not the page loaded
        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }

        let html = loaded?;
        let records = parse_listing(&html, &tooltip_parser);

        reporter
            .info(format!("Collection finished. {} records found.", records.len()))
            .await;
        Ok(records)
    }

    async fn load_full_page(
        &self,
        session: &mut dyn BrowserSession,
        reporter: &StatusReporter,
    ) -> Result<String, ExtractError> {
        session.goto(&self.config.target_url).await?;
        reporter.info("Page loaded. Scrolling to load every listing...").await;

        match scroll_until_stable(session, self.config.scroll_settle(), self.config.max_scrolls).await {
            Ok(scrolls) => {
                info!("Page height settled after {} scrolls", scrolls);
                reporter.info("Scroll complete. Extracting data from the page...").await;
            }
            Err(ExtractError::ScrollLimit(limit)) => {
                warn!("Page height still growing after {} scrolls, parsing what is loaded", limit);
                reporter
                    .info(format!(
                        "Scroll limit of {} reached. Extracting the listings loaded so far...",
                        limit
                    ))
                    .await;
            }
            Err(e) => return Err(e),
        }

        session.page_source().await
    }
}

/// Scroll to the bottom until two consecutive height measurements agree.
///
/// Returns the number of scrolls performed, or `ExtractError::ScrollLimit` once
/// `max_scrolls` scrolls have not settled the height.
pub async fn scroll_until_stable(
    session: &mut dyn BrowserSession,
    settle: Duration,
    max_scrolls: u32,
) -> Result<u32, ExtractError> {
    let mut last_height = session.page_height().await?;

    for scroll in 1..=max_scrolls {
        session.scroll_to_bottom().await?;
        tokio::time::sleep(settle).await;

        let new_height = session.page_height().await?;
        debug!(scroll, last_height, new_height, "Scrolled");
        if new_height == last_height {
            return Ok(scroll);
        }
        last_height = new_height;
    }

    Err(ExtractError::ScrollLimit(max_scrolls))
}

/// Parse every result row of a fully loaded listing page.
///
/// Rows without a title are skipped; every other missing field falls back to its default.
pub fn parse_listing(html: &str, tooltip_parser: &ReviewTooltipParser) -> Vec<RawRecord> {
    let document = Html::parse_document(html);

    document
        .select(&ROW_SELECTOR)
        .filter_map(|row| parse_row(row, tooltip_parser))
        .collect()
}

fn parse_row(row: ElementRef<'_>, tooltip_parser: &ReviewTooltipParser) -> Option<RawRecord> {
    let title = row
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
        .filter(|title| !title.is_empty());

    let Some(title) = title else {
        debug!("Skipping result row without a title");
        return None;
    };

    let raw_price = row
        .select(&DISCOUNT_PRICE_SELECTOR)
        .next()
        .or_else(|| row.select(&PRICE_SELECTOR).next())
        .map(|el| price_text_after_currency(&clean_text(&el.text().collect::<String>())))
        .unwrap_or_else(|| MISSING_PRICE.to_string());

    let mut record = RawRecord {
        title,
        raw_price,
        ..Default::default()
    };

    let tooltip = row
        .select(&REVIEW_SELECTOR)
        .next()
        .and_then(|el| el.value().attr(TOOLTIP_ATTR));

    if let Some(tooltip) = tooltip {
        let summary = tooltip_parser.parse(tooltip);
        record.raw_review_summary = summary.label;
        record.review_percent_positive = summary.percent_positive;
        record.review_count = summary.count;
    }

    Some(record)
}
