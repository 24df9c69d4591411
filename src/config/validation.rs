use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if !config.listing_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "listing_path must start with '/', got '{}'",
            config.listing_path
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.max_concurrent_articles < 1 || config.max_concurrent_articles > 1000 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_articles must be between 1 and 1000, got {}",
            config.max_concurrent_articles
        )));
    }

    if config.max_retry_rounds < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retry_rounds must be >= 1, got {}",
            config.max_retry_rounds
        )));
    }

    if config.page_batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_batch_size must be >= 1, got {}",
            config.page_batch_size
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.start_page < 1 {
        return Err(ConfigError::Validation(format!(
            "start_page must be >= 1, got {}",
            config.start_page
        )));
    }

    if let Some(end) = config.end_page {
        if end < config.start_page {
            return Err(ConfigError::Validation(format!(
                "end_page ({}) must be >= start_page ({})",
                end, config.start_page
            )));
        }
    }

    if let Some(cap) = config.articles_per_page {
        if cap < 1 {
            return Err(ConfigError::Validation(format!(
                "articles_per_page must be >= 1, got {}",
                cap
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root_dir.is_empty() {
        return Err(ConfigError::Validation(
            "root_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            site: SiteConfig {
                base_url: "http://gallery.example".to_string(),
                listing_path: "/new.html".to_string(),
            },
            crawler: CrawlerConfig {
                max_retries: 3,
                retry_delay_ms: 1000,
                max_concurrent_articles: 10,
                max_retry_rounds: 5,
                page_batch_size: 30,
                articles_per_page: None,
                request_timeout_secs: 10,
                start_page: 1,
                end_page: None,
            },
            output: OutputConfig {
                root_dir: "./photos".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = base_config();
        config.site.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let mut config = base_config();
        config.site.base_url = "ftp://gallery.example".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_listing_path_must_be_absolute() {
        let mut config = base_config();
        config.site.listing_path = "new.html".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let mut config = base_config();
        config.crawler.max_retries = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = base_config();
        config.crawler.max_concurrent_articles = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_start_page_rejected() {
        let mut config = base_config();
        config.crawler.start_page = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_end_page_before_start_page() {
        let mut config = base_config();
        config.crawler.start_page = 5;
        config.crawler.end_page = Some(2);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_root_dir_rejected() {
        let mut config = base_config();
        config.output.root_dir = String::new();
        assert!(validate(&config).is_err());
    }
}
