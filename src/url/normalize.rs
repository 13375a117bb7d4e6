use crate::UrlError;
use url::Url;

/// Normalizes a category URL by dropping its query and fragment
///
/// Listing pages are addressed by appending `letter` and `page` parameters, so
/// anything already in the query string of the configured URL (such as
/// `mt=8`) is removed first.
///
/// # Examples
///
/// ```
/// use appstore_harvest::url::normalize_category_url;
///
/// let url = normalize_category_url("https://itunes.apple.com/us/genre/ios-games/id6014?mt=8#top").unwrap();
/// assert_eq!(url.as_str(), "https://itunes.apple.com/us/genre/ios-games/id6014");
/// ```
pub fn normalize_category_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Builds the listing URL for one (letter, page) pair of a normalized category
///
/// # Examples
///
/// ```
/// use appstore_harvest::url::{listing_url, normalize_category_url};
///
/// let base = normalize_category_url("https://itunes.apple.com/us/genre/ios-games/id6014?mt=8").unwrap();
/// assert_eq!(
///     listing_url(&base, 'B', 3).as_str(),
///     "https://itunes.apple.com/us/genre/ios-games/id6014?letter=B&page=3"
/// );
/// ```
pub fn listing_url(normalized: &Url, letter: char, page: u32) -> Url {
    let mut url = normalized.clone();
    url.set_query(Some(&format!("letter={}&page={}", letter, page)));
    url
}
