//! Text normalization shared by the parsers

use scraper::ElementRef;

/// Collapses every whitespace run into a single space and trims both ends
///
/// Token order is preserved.
///
/// # Example
/// ```
/// use wgcrawl_core::parser::text::normalize_whitespace;
/// assert_eq!(normalize_whitespace("  Main   St ,   12345  City "), "Main St , 12345 City");
/// ```
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenated text of an element and its descendants, trimmed
pub fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Removes a trailing unit marker (e.g. "€", "m²") and surrounding whitespace
pub fn strip_unit<'a>(text: &'a str, unit: &str) -> &'a str {
    let trimmed = text.trim();
    trimmed
        .strip_suffix(unit)
        .map(str::trim_end)
        .unwrap_or(trimmed)
}

/// Last whitespace-delimited token, `None` if the text has none
pub fn last_token(text: &str) -> Option<&str> {
    text.split_whitespace().next_back()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_normalize_whitespace_address() {
        assert_eq!(
            normalize_whitespace("  Main   St ,   12345  City "),
            "Main St , 12345 City"
        );
    }

    #[test]
    fn test_normalize_whitespace_newlines_and_tabs() {
        assert_eq!(
            normalize_whitespace("\n\t Kaiserstraße 12\n\n      76133 Karlsruhe\t"),
            "Kaiserstraße 12 76133 Karlsruhe"
        );
    }

    #[test]
    fn test_normalize_whitespace_empty() {
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace(" \n "), "");
    }

    #[test]
    fn test_strip_unit() {
        assert_eq!(strip_unit("540€", "€"), "540");
        assert_eq!(strip_unit("  540 € ", "€"), "540");
        assert_eq!(strip_unit("48m²", "m²"), "48");
        assert_eq!(strip_unit("2", "m²"), "2");
    }

    #[test]
    fn test_last_token() {
        assert_eq!(last_token("Anzeigen-ID: 1234567"), Some("1234567"));
        assert_eq!(last_token("  single  "), Some("single"));
        assert_eq!(last_token(""), None);
        assert_eq!(last_token(" \n\t "), None);
    }

    #[test]
    fn test_element_text_joins_children() {
        let html = Html::parse_fragment("<h2> 540<span>€</span> </h2>");
        let selector = Selector::parse("h2").unwrap();
        let element = html.select(&selector).next().unwrap();
        assert_eq!(element_text(&element), "540€");
    }

    proptest! {
        #[test]
        fn prop_normalized_text_has_no_whitespace_runs(s in "\\PC*") {
            let normalized = normalize_whitespace(&s);
            prop_assert!(!normalized.contains("  "));
            prop_assert_eq!(normalized.trim(), normalized.as_str());
            prop_assert!(!normalized.chars().any(|c| c.is_whitespace() && c != ' '));
        }

        #[test]
        fn prop_normalize_keeps_token_order(
            tokens in prop::collection::vec("[a-zA-Z0-9,.]{1,8}", 0..8),
            pad in "[ \t\n]{1,4}"
        ) {
            let padded = format!("{pad}{}{pad}", tokens.join(pad.as_str()));
            prop_assert_eq!(normalize_whitespace(&padded), tokens.join(" "));
        }

        #[test]
        fn prop_normalize_is_idempotent(s in "\\PC*") {
            let once = normalize_whitespace(&s);
            prop_assert_eq!(normalize_whitespace(&once), once);
        }
    }
}
