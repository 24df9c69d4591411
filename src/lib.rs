//! Pictoria: a pagination-aware gallery archiver
//!
//! This crate implements a scraper for a paginated image-gallery site. It walks
//! article listing pages, resolves each article's internal pagination, downloads
//! every image under bounded concurrency, normalizes encodings to JPEG, and
//! persists a per-article metadata record alongside the files.

pub mod archive;
pub mod config;
pub mod crawler;
pub mod fetch;
pub mod parse;

use thiserror::Error;

/// Main error type for Pictoria operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTML parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("First listing page unreachable: {url}")]
    ListingUnreachable { url: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Worker task error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors for the site-markup contract
///
/// A page missing an expected content region is a structural failure: it aborts
/// the affected article or listing page instead of being silently swallowed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Listing page has no article list region")]
    MissingListingRegion,

    #[error("Article entry has no link")]
    MissingArticleLink,

    #[error("Article page has no title")]
    MissingTitle,

    #[error("Cannot resolve URL '{href}': {message}")]
    BadHref { href: String, message: String },
}

/// Result type alias for Pictoria operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use archive::{ArticleMetadata, ImageRecord, ImageStatus};
pub use config::Config;
pub use crawler::{run_crawl, CrawlDriver, CrawlSummary, DownloadOutcome};
pub use fetch::{FetchOutcome, PageFetcher, RetryPolicy};
