use crate::config::DEFAULT_DETAIL_URL_PATTERN;
use crate::ConfigError;
use regex::Regex;

/// Decides whether an absolute URL points at a catalog detail page
///
/// The pattern is anchored by convention (`^...$`); a link only qualifies when
/// the whole URL, query suffix included, matches.
#[derive(Debug, Clone)]
pub struct DetailUrlMatcher {
    pattern: Regex,
}

impl DetailUrlMatcher {
    /// Compiles a matcher from a regular expression
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
        Ok(Self { pattern })
    }

    /// Returns true if the URL is a detail-page URL
    ///
    /// # Examples
    ///
    /// ```
    /// use appstore_harvest::url::DetailUrlMatcher;
    ///
    /// let matcher = DetailUrlMatcher::default();
    /// assert!(matcher.is_detail_url("https://itunes.apple.com/us/app/archery-king/id1121971067?mt=8"));
    /// assert!(!matcher.is_detail_url("https://itunes.apple.com/us/genre/ios-games/id6014?mt=8"));
    /// ```
    pub fn is_detail_url(&self, candidate: &str) -> bool {
        self.pattern.is_match(candidate)
    }
}

impl Default for DetailUrlMatcher {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_DETAIL_URL_PATTERN)
                .unwrap_or_else(|e| unreachable!("built-in detail pattern is invalid: {e}")),
        }
    }
}
