//! URL helper functions for wg-gesucht.de
//!
//! Provides the site origin and href resolution for listing cards.

/// Origin that relative card hrefs are resolved against
pub const BASE_URL: &str = "https://www.wg-gesucht.de";

/// Flat search in Karlsruhe, at least 40 m², at most 600 € rent
pub const DEFAULT_LISTING_URL: &str = "https://www.wg-gesucht.de/wohnungen-in-Karlsruhe.68.2.1.0.html?offer_filter=1&city_id=68&noDeact=1&categories%5B%5D=2&rent_types%5B%5D=2&sMin=40&rMax=600";

/// Resolves a card href into an absolute detail page URL
///
/// Absolute `http(s)://` hrefs are returned as-is. Relative hrefs are
/// joined to `base_origin` with exactly one `/` between them.
///
/// # Returns
/// `None` if the href is empty or whitespace only
///
/// # Example
/// ```
/// use wgcrawl_core::url::resolve_href;
/// let url = resolve_href("https://www.wg-gesucht.de", "/wohnungen-in-Karlsruhe.123.html");
/// assert_eq!(url.as_deref(), Some("https://www.wg-gesucht.de/wohnungen-in-Karlsruhe.123.html"));
/// ```
pub fn resolve_href(base_origin: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }

    Some(format!(
        "{}/{}",
        base_origin.trim_end_matches('/'),
        href.trim_start_matches('/')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_href_with_leading_slash() {
        let url = resolve_href(BASE_URL, "/wohnungen-in-Karlsruhe.123.html");
        assert_eq!(
            url.as_deref(),
            Some("https://www.wg-gesucht.de/wohnungen-in-Karlsruhe.123.html")
        );
    }

    #[test]
    fn test_resolve_href_without_leading_slash() {
        let url = resolve_href(BASE_URL, "wohnungen-in-Karlsruhe.123.html");
        assert_eq!(
            url.as_deref(),
            Some("https://www.wg-gesucht.de/wohnungen-in-Karlsruhe.123.html")
        );
    }

    #[test]
    fn test_resolve_href_base_with_trailing_slash() {
        let url = resolve_href("http://127.0.0.1:8080/", "/a.html");
        assert_eq!(url.as_deref(), Some("http://127.0.0.1:8080/a.html"));
    }

    #[test]
    fn test_resolve_href_absolute() {
        let url = resolve_href(BASE_URL, "https://other.example/offer.html");
        assert_eq!(url.as_deref(), Some("https://other.example/offer.html"));
    }

    #[test]
    fn test_resolve_href_empty() {
        assert_eq!(resolve_href(BASE_URL, ""), None);
        assert_eq!(resolve_href(BASE_URL, "   "), None);
    }
}
