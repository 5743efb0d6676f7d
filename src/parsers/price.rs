use crate::models::{Price, MISSING_PRICE};

const CURRENCY_MARKER: &str = "R$";

/// Keep only the text after the last currency marker.
///
/// Discounted listings render both prices ("R$ 99,90 R$ 59,90"); the last one is the
/// price actually charged. Empty input yields the missing-price sentinel.
pub fn price_text_after_currency(text: &str) -> String {
    let last = text
        .rsplit(CURRENCY_MARKER)
        .next()
        .unwrap_or_default()
        .trim();

    if last.is_empty() {
        MISSING_PRICE.to_string()
    } else {
        last.to_string()
    }
}

/// Parse a pt-BR formatted amount such as `1.234,56`.
///
/// Dots are thousands separators and the comma is the decimal mark. Anything that
/// does not parse afterwards ("Gratuito", stray symbols) is zero.
pub fn parse_locale_price(text: &str) -> Price {
    let normalized = text.trim().replace('.', "").replace(',', ".");

    normalized
        .parse::<f64>()
        .map(Price::from_f64)
        .unwrap_or(Price::ZERO)
}
