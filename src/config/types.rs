use serde::Deserialize;

/// Main configuration structure for Pictoria
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site root, e.g. "http://25.xy02.my"
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the first listing page, e.g. "/new.html"
    #[serde(rename = "listing-path")]
    pub listing_path: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum attempts per network operation (page fetch or image download)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts, in milliseconds
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Admission-gate capacity: articles processed simultaneously
    #[serde(rename = "max-concurrent-articles")]
    pub max_concurrent_articles: u32,

    /// Bound on article-level retry rounds for failed images
    #[serde(rename = "max-retry-rounds", default = "default_retry_rounds")]
    pub max_retry_rounds: u32,

    /// Sub-page fetch fan-out cap within one article
    #[serde(rename = "page-batch-size", default = "default_page_batch")]
    pub page_batch_size: u32,

    /// Cap on articles taken from each listing page (absent = all)
    #[serde(rename = "articles-per-page")]
    pub articles_per_page: Option<usize>,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// First listing page to walk
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,

    /// Last listing page to walk (absent = run until exhaustion)
    #[serde(rename = "end-page")]
    pub end_page: Option<u32>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory under which category/article trees are created
    #[serde(rename = "root-dir")]
    pub root_dir: String,
}

fn default_retry_rounds() -> u32 {
    5
}

fn default_page_batch() -> u32 {
    30
}

fn default_timeout() -> u64 {
    10
}

fn default_start_page() -> u32 {
    1
}
