use serde::Deserialize;

/// Default storefront detail-page URL: `/<country>/app/<slug>/id<digits>?mt=8`
pub const DEFAULT_DETAIL_URL_PATTERN: &str =
    r"^https?://itunes\.apple\.com/[a-z]{2}/app/[^/?#]+/id\d+\?mt=8$";

/// Desktop browser identity sent with every request
pub const DEFAULT_IDENTITY: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_6) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/60.0.3112.113 Safari/537.36";

/// Main configuration structure for Appstore-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(rename = "category", default)]
    pub categories: Vec<CategoryEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of detail pages in flight at once
    #[serde(rename = "max-concurrent-details", default = "default_max_concurrent")]
    pub max_concurrent_details: usize,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Failed attempts before a link is quarantined (0 keeps it queued forever)
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_details: default_max_concurrent(),
            request_timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Identity header configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Full User-Agent header value
    #[serde(default = "default_identity")]
    pub identity: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            identity: default_identity(),
        }
    }
}

/// Storefront layout configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Regular expression a link must match to count as a detail page
    #[serde(rename = "detail-url-pattern", default = "default_pattern")]
    pub detail_url_pattern: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            detail_url_pattern: default_pattern(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// One category listing to walk
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub url: String,
}

fn default_max_concurrent() -> usize {
    8
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    5
}

fn default_identity() -> String {
    DEFAULT_IDENTITY.to_string()
}

fn default_pattern() -> String {
    DEFAULT_DETAIL_URL_PATTERN.to_string()
}

fn default_database_path() -> String {
    "./app_store.db".to_string()
}
