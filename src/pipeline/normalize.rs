use tracing::debug;

use crate::models::{review_score, GameRecord, RawRecord};
use crate::parsers::parse_locale_price;

const MAX_PERCENT: u32 = 100;

/// Coerce raw listings into typed records. Never fails; untitled records are dropped.
pub fn normalize(raw: Vec<RawRecord>) -> Vec<GameRecord> {
    raw.into_iter().filter_map(normalize_record).collect()
}

fn normalize_record(raw: RawRecord) -> Option<GameRecord> {
    let title = raw.title.trim().to_string();
    if title.is_empty() {
        debug!("Dropping record without a title");
        return None;
    }

    let review_label = raw.raw_review_summary.trim().to_string();
    let review_score = review_score(&review_label);

    Some(GameRecord {
        title,
        price: parse_locale_price(&raw.raw_price),
        review_label,
        review_score,
        review_percent_positive: raw.review_percent_positive.min(MAX_PERCENT),
        review_count: raw.review_count,
    })
}
