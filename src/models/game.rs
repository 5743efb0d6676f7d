use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review label used when a listing carries no review tooltip.
pub const NO_RATING_LABEL: &str = "Sem avaliação";

/// Price text used when a listing has no price node.
pub const MISSING_PRICE: &str = "0";

/// One listing as scraped from markup, before any coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub title: String,
    pub raw_price: String,
    pub raw_review_summary: String,
    pub review_percent_positive: u32,
    pub review_count: u32,
}

impl Default for RawRecord {
    fn default() -> Self {
        Self {
            title: String::new(),
            raw_price: MISSING_PRICE.to_string(),
            raw_review_summary: NO_RATING_LABEL.to_string(),
            review_percent_positive: 0,
            review_count: 0,
        }
    }
}

// NewType over whole cents so two-decimal values stay exact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Rounds to the nearest cent. Negative, NaN and infinite values become zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Price::ZERO;
        }
        let cents = (value * 100.0).round();
        if cents >= i64::MAX as f64 {
            return Price::ZERO;
        }
        Price(cents as i64)
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Canonical, typed listing as persisted in the `games` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub title: String,
    pub price: Price,
    pub review_label: String,
    pub review_score: u8,
    pub review_percent_positive: u32,
    pub review_count: u32,
}

/// A persisted row, as returned by queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredGame {
    pub id: i64,
    #[serde(flatten)]
    pub game: GameRecord,
    pub last_collected_at: NaiveDateTime,
}
