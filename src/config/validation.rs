use crate::config::types::{CatalogConfig, CategoryEntry, Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_identity(&config.user_agent.identity)?;
    validate_catalog_config(&config.catalog)?;
    validate_output_config(&config.output)?;
    validate_categories(&config.categories)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_details < 1 || config.max_concurrent_details > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-details must be between 1 and 100, got {}",
            config.max_concurrent_details
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 600 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be between 1 and 600, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// The identity is sent verbatim as a header value
fn validate_identity(identity: &str) -> Result<(), ConfigError> {
    if identity.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent identity cannot be empty".to_string(),
        ));
    }

    if identity.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(
            "user-agent identity cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    Regex::new(&config.detail_url_pattern).map_err(|e| {
        ConfigError::InvalidPattern(format!("'{}': {}", config.detail_url_pattern, e))
    })?;
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates category listing URLs
fn validate_categories(categories: &[CategoryEntry]) -> Result<(), ConfigError> {
    for entry in categories {
        let url = Url::parse(&entry.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid category URL '{}': {}", entry.url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Category URL '{}' must use HTTP or HTTPS",
                entry.url
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "Category URL '{}' has no host",
                entry.url
            )));
        }
    }

    Ok(())
}
