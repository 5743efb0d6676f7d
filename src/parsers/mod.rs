pub mod price;
pub mod review;

pub use price::*;
pub use review::*;

use html_escape::decode_html_entities;

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_entities() {
        assert_eq!(clean_text("  Half-Life&nbsp;2 \n  Deluxe "), "Half-Life 2 Deluxe");
        assert_eq!(clean_text("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(clean_text("   "), "");
    }
}
