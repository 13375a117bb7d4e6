//! Listing-page parser
//!
//! Extracts the detail-page links from one category listing page. Every
//! `<a href>` is resolved against the listing URL and kept only if it matches
//! the configured detail-URL pattern.

use crate::url::{resolve_link, DetailUrlMatcher};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracts the de-duplicated detail-page links of a listing page
///
/// # Arguments
///
/// * `html` - The listing page body
/// * `base_url` - The listing URL, for resolving relative links
/// * `matcher` - The detail-page URL pattern
///
/// # Example
///
/// ```
/// use appstore_harvest::crawler::extract_detail_links;
/// use appstore_harvest::url::DetailUrlMatcher;
/// use url::Url;
///
/// let html = r#"<ul><li><a href="https://itunes.apple.com/us/app/archery-king/id1121971067?mt=8">Archery King</a></li>
///     <li><a href="https://itunes.apple.com/us/genre/ios-games/id6014?mt=8&letter=B">B</a></li></ul>"#;
/// let base = Url::parse("https://itunes.apple.com/us/genre/ios-games/id6014?letter=A&page=1").unwrap();
/// let links = extract_detail_links(html, &base, &DetailUrlMatcher::default());
/// assert_eq!(links.len(), 1);
/// ```
pub fn extract_detail_links(html: &str, base_url: &Url, matcher: &DetailUrlMatcher) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    let mut links = BTreeSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(absolute_url) = resolve_link(href, base_url) {
            if matcher.is_detail_url(&absolute_url) {
                links.insert(absolute_url);
            }
        }
    }

    links
}
