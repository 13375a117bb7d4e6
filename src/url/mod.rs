//! URL handling module for Appstore-Harvest
//!
//! This module provides category URL normalization, listing URL construction,
//! link resolution and detail-page URL matching.

mod matcher;
mod normalize;

// Re-export main functions
pub use matcher::DetailUrlMatcher;
pub use normalize::{listing_url, normalize_category_url};

use ::url::Url;

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - Non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use appstore_harvest::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://itunes.apple.com/us/genre/id6014?letter=A&page=1").unwrap();
/// assert_eq!(
///     resolve_link("/us/app/x/id1?mt=8", &base).as_deref(),
///     Some("https://itunes.apple.com/us/app/x/id1?mt=8")
/// );
/// assert_eq!(resolve_link("javascript:void(0)", &base), None);
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url.to_string())
    } else {
        None
    }
}
