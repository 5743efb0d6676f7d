use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::NO_RATING_LABEL;
use crate::parsers::clean_text;

static PERCENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)%")
        .expect("Invalid percent regex")
});

const LINE_BREAK: &str = "<br>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub label: String,
    pub percent_positive: u32,
    pub count: u32,
}

impl Default for ReviewSummary {
    fn default() -> Self {
        Self {
            label: NO_RATING_LABEL.to_string(),
            percent_positive: 0,
            count: 0,
        }
    }
}

/// Parses the review tooltip, e.g. `Muito positivas<br>85% das 1,200 análises de usuários...`.
pub struct ReviewTooltipParser {
    count_regex: Regex,
}

impl ReviewTooltipParser {
    pub fn new(count_word: &str) -> Result<Self, regex::Error> {
        let pattern = format!(r"([\d,]+)\s+{}", regex::escape(count_word.trim()));
        Ok(Self {
            count_regex: Regex::new(&pattern)?,
        })
    }

    /// Either match failing leaves that field at zero.
    pub fn parse(&self, tooltip: &str) -> ReviewSummary {
        let label = tooltip
            .split(LINE_BREAK)
            .next()
            .map(clean_text)
            .unwrap_or_default();

        let percent_positive = PERCENT_REGEX
            .captures(tooltip)
            .and_then(|cap| cap.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0);

        let count = self
            .count_regex
            .captures(tooltip)
            .and_then(|cap| cap.get(1))
            .and_then(|m| m.as_str().replace(',', "").parse::<u32>().ok())
            .unwrap_or(0);

        ReviewSummary {
            label,
            percent_positive,
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parser() -> ReviewTooltipParser {
        ReviewTooltipParser::new("análises").unwrap()
    }

    #[test]
    fn parses_full_tooltip() {
        let summary = parser().parse("Muito positivas<br>85% das 1,200 análises de usuários deste jogo são positivas.");
        assert_eq!(
            summary,
            ReviewSummary {
                label: "Muito positivas".to_string(),
                percent_positive: 85,
                count: 1200,
            }
        );
    }

    #[test]
    fn missing_matches_default_to_zero() {
        let summary = parser().parse("  Positivas  <br>sem números aqui");
        assert_eq!(summary.label, "Positivas");
        assert_eq!(summary.percent_positive, 0);
        assert_eq!(summary.count, 0);
    }

    #[test]
    fn count_needs_the_localized_word() {
        let summary = parser().parse("Very Positive<br>92% of the 45,000 user reviews");
        assert_eq!(summary.percent_positive, 92);
        assert_eq!(summary.count, 0);

        let english = ReviewTooltipParser::new("user reviews").unwrap();
        assert_eq!(english.parse("Very Positive<br>92% of the 45,000 user reviews").count, 45000);
    }

    #[test]
    fn oversized_count_is_zero() {
        assert_eq!(parser().parse("Positivas<br>99,999,999,999 análises").count, 0);
    }
}
