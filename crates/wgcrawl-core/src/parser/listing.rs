//! Listing page parser for wg-gesucht.de
//!
//! Discovers detail page links referenced by the offer cards of a
//! search results page.

use scraper::{Html, Selector};

use crate::error::{CrawlError, Result};
use crate::url::resolve_href;

/// Anchor inside the headline of every offer card
///
/// The card class carries a trailing space on the site and is compared
/// as the whole attribute value.
pub const CARD_LINK_SELECTOR: &str = r#"div[class="wgg_card offer_list_item "] h3 a"#;

/// Parses a listing page and returns the absolute detail page URLs
///
/// # Arguments
/// * `html` - Raw HTML of the search results page
/// * `base_origin` - Origin relative hrefs are resolved against
///
/// # Returns
/// URLs in document order, duplicates preserved. Empty if no card matched.
///
/// # Errors
/// Returns `InvalidSelector` if the card selector does not parse
pub fn discover_links(html: &str, base_origin: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(CARD_LINK_SELECTOR)
        .map_err(|e| CrawlError::InvalidSelector(format!("{CARD_LINK_SELECTOR}: {e:?}")))?;

    let links = document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve_href(base_origin, href))
        .collect();

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::BASE_URL;

    const LISTING: &str = include_str!("../../tests/fixtures/listing.html");

    #[test]
    fn test_discover_links_fixture() {
        let links = discover_links(LISTING, BASE_URL).unwrap();
        assert_eq!(
            links,
            vec![
                "https://www.wg-gesucht.de/wohnungen-in-Karlsruhe-Innenstadt-West.9012345.html",
                "https://www.wg-gesucht.de/wohnungen-in-Karlsruhe-Durlach.9012346.html",
                "https://www.wg-gesucht.de/wohnungen-in-Karlsruhe-Oststadt.9012347.html",
            ]
        );
    }

    #[test]
    fn test_discover_links_ignores_other_anchors() {
        // The fixture also carries a sponsored card and navigation links
        let links = discover_links(LISTING, BASE_URL).unwrap();
        assert!(links.iter().all(|l| !l.contains("sponsored")));
        assert!(links.iter().all(|l| !l.contains("impressum")));
    }

    #[test]
    fn test_discover_links_empty_page() {
        let html = "<html><body><p>Keine Angebote gefunden</p></body></html>";
        let links = discover_links(html, BASE_URL).unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn test_discover_links_keeps_duplicates_in_order() {
        let html = r#"
        <html><body>
            <div class="wgg_card offer_list_item "><h3><a href="/b.html">B</a></h3></div>
            <div class="wgg_card offer_list_item "><h3><a href="/a.html">A</a></h3></div>
            <div class="wgg_card offer_list_item "><h3><a href="/b.html">B again</a></h3></div>
        </body></html>
        "#;
        let links = discover_links(html, "http://localhost:9000").unwrap();
        assert_eq!(
            links,
            vec![
                "http://localhost:9000/b.html",
                "http://localhost:9000/a.html",
                "http://localhost:9000/b.html",
            ]
        );
    }

    #[test]
    fn test_discover_links_n_cards_give_base_plus_href() {
        let hrefs: Vec<String> = (0..7).map(|i| format!("/offer.{i}.html")).collect();
        let cards: String = hrefs
            .iter()
            .map(|h| {
                format!(
                    r#"<div class="wgg_card offer_list_item "><div><h3 class="truncate_title"><a href="{h}">x</a></h3></div></div>"#
                )
            })
            .collect();
        let html = format!("<html><body>{cards}</body></html>");

        let links = discover_links(&html, BASE_URL).unwrap();
        assert_eq!(links.len(), hrefs.len());
        for (link, href) in links.iter().zip(&hrefs) {
            assert_eq!(link, &format!("{BASE_URL}{href}"));
        }
    }

    #[test]
    fn test_discover_links_skips_anchor_without_href() {
        let html = r#"
        <div class="wgg_card offer_list_item "><h3><a>no link</a></h3></div>
        <div class="wgg_card offer_list_item "><h3><a href="">empty</a></h3></div>
        <div class="wgg_card offer_list_item "><h3><a href="/ok.html">ok</a></h3></div>
        "#;
        let links = discover_links(html, BASE_URL).unwrap();
        assert_eq!(links, vec!["https://www.wg-gesucht.de/ok.html"]);
    }
}
