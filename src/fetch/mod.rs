//! HTTP fetching
//!
//! This module handles all HTTP requests for the archiver:
//! - Building the HTTP client with a proper user agent
//! - GET requests for listing, article, and image resources
//! - Outcome classification: content, not-found, or failure
//!
//! A 404 is the site's normal signal that pagination has run past the end, so
//! it is surfaced as its own variant, returned immediately, and never logged
//! as an error.

pub mod retry;

use crate::config::CrawlerConfig;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub use retry::{with_retry, Attempt, Outcome, RetryPolicy};

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// 200: the raw page body
    Content(String),

    /// 404: the page does not exist (pagination-termination signal)
    NotFound,

    /// Retries exhausted on a transient error or non-200/404 status
    Failed,
}

impl FetchOutcome {
    /// Returns the body if the fetch produced content
    pub fn into_content(self) -> Option<String> {
        match self {
            Self::Content(body) => Some(body),
            _ => None,
        }
    }
}

/// Builds the HTTP client shared by the whole crawl run
///
/// One client means one connection pool across every article processor.
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.request_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with bounded retry and outcome classification
///
/// Stateless across calls; cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl PageFetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Fetches a page body as text
    ///
    /// 200 maps to `Content`, 404 to `NotFound` (immediately, no retry), and
    /// everything else is retried under the policy before escalating to
    /// `Failed` with a single diagnostic.
    pub async fn fetch_page(&self, url: &str) -> FetchOutcome {
        let client = self.client.clone();
        let target = url.to_string();

        let outcome = with_retry(&self.policy, || {
            let client = client.clone();
            let target = target.clone();
            async move {
                match client.get(&target).send().await {
                    Ok(response) => {
                        let status = response.status();
                        if status == StatusCode::NOT_FOUND {
                            return Attempt::NotFound;
                        }
                        if !status.is_success() {
                            return Attempt::Retry(format!("HTTP {}", status.as_u16()));
                        }
                        match response.text().await {
                            Ok(body) => Attempt::Done(body),
                            Err(e) => Attempt::Retry(format!("body read failed: {}", e)),
                        }
                    }
                    Err(e) => Attempt::Retry(e.to_string()),
                }
            }
        })
        .await;

        match outcome {
            Outcome::Done(body) => FetchOutcome::Content(body),
            Outcome::NotFound => FetchOutcome::NotFound,
            Outcome::Failed(reason) => {
                tracing::warn!("Failed to fetch {}: {}", url, reason);
                FetchOutcome::Failed
            }
        }
    }

    /// Fetches a raw body, for resources that are not text
    ///
    /// Same classification and retry shape as [`fetch_page`](Self::fetch_page);
    /// the caller decides how to log a failure.
    pub async fn fetch_bytes(&self, url: &str) -> Outcome<Vec<u8>> {
        let client = self.client.clone();
        let target = url.to_string();

        with_retry(&self.policy, || {
            let client = client.clone();
            let target = target.clone();
            async move {
                match client.get(&target).send().await {
                    Ok(response) => {
                        let status = response.status();
                        if status == StatusCode::NOT_FOUND {
                            return Attempt::NotFound;
                        }
                        if !status.is_success() {
                            return Attempt::Retry(format!("HTTP {}", status.as_u16()));
                        }
                        match response.bytes().await {
                            Ok(body) => Attempt::Done(body.to_vec()),
                            Err(e) => Attempt::Retry(format!("body read failed: {}", e)),
                        }
                    }
                    Err(e) => Attempt::Retry(e.to_string()),
                }
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_crawler_config() -> CrawlerConfig {
        CrawlerConfig {
            max_retries: 3,
            retry_delay_ms: 0,
            max_concurrent_articles: 4,
            max_retry_rounds: 5,
            page_batch_size: 30,
            articles_per_page: None,
            request_timeout_secs: 5,
            start_page: 1,
            end_page: None,
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&test_crawler_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_policy_from_config() {
        let mut config = test_crawler_config();
        config.max_retries = 7;
        config.retry_delay_ms = 250;

        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, 7);
        assert_eq!(policy.delay, Duration::from_millis(250));
    }

    #[test]
    fn test_into_content() {
        assert_eq!(
            FetchOutcome::Content("body".to_string()).into_content(),
            Some("body".to_string())
        );
        assert_eq!(FetchOutcome::NotFound.into_content(), None);
        assert_eq!(FetchOutcome::Failed.into_content(), None);
    }
}
