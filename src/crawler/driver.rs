//! Crawl driver: listing-page iteration and article dispatch
//!
//! The driver walks listing pages from the configured start page until the
//! site runs out (a missing page or an empty listing), or until the optional
//! end page. Every article on a page is dispatched concurrently through one
//! global admission gate; the driver waits for the whole page to finish
//! before advancing, so progress is page-granular and interruption loses at
//! most one page of partially-archived articles (which the resume check
//! recovers on the next run).

use crate::config::Config;
use crate::crawler::article::{ArticleOutcome, ArticleProcessor};
use crate::crawler::materializer::ImageMaterializer;
use crate::fetch::{build_http_client, FetchOutcome, PageFetcher, RetryPolicy};
use crate::parse;
use crate::HarvestError;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Totals for one crawl run
#[derive(Debug, Default, Clone)]
pub struct CrawlSummary {
    pub listing_pages: u32,
    pub articles_archived: usize,
    pub articles_skipped: usize,
    pub images_archived: usize,
    pub images_failed: usize,
}

/// Drives a full crawl run
pub struct CrawlDriver {
    config: Arc<Config>,
    base: Url,
    fetcher: PageFetcher,
    processor: Arc<ArticleProcessor>,
    /// Admission gate bounding simultaneously-open article pipelines
    gate: Arc<Semaphore>,
}

impl CrawlDriver {
    /// Builds a driver from a validated configuration
    ///
    /// One HTTP client (and so one connection pool) is shared by the page
    /// fetcher and the image materializer across every article.
    pub fn new(config: Config) -> crate::Result<Self> {
        let base = Url::parse(&config.site.base_url)?;
        let client = build_http_client(&config.crawler)?;
        let policy = RetryPolicy::from(&config.crawler);

        let fetcher = PageFetcher::new(client.clone(), policy);
        let materializer = ImageMaterializer::new(client, policy);

        let config = Arc::new(config);
        let processor = Arc::new(ArticleProcessor::new(
            fetcher.clone(),
            materializer,
            config.clone(),
            base.clone(),
        ));
        let gate = Arc::new(Semaphore::new(
            config.crawler.max_concurrent_articles as usize,
        ));

        Ok(Self {
            config,
            base,
            fetcher,
            processor,
            gate,
        })
    }

    /// Runs the crawl until exhaustion or the configured end page
    ///
    /// An unreachable first listing page is a hard error; any later missing
    /// page is the normal exhaustion signal.
    pub async fn run(&self) -> crate::Result<CrawlSummary> {
        let start_page = self.config.crawler.start_page;
        let mut summary = CrawlSummary::default();
        let mut current = start_page;

        loop {
            let page_url = self.listing_url(current)?;
            tracing::info!("Listing page {}: {}", current, page_url);
            let started = Instant::now();

            let body = match self.fetcher.fetch_page(&page_url).await {
                FetchOutcome::Content(body) => body,
                _ => {
                    if current == start_page {
                        return Err(HarvestError::ListingUnreachable { url: page_url });
                    }
                    tracing::info!("Listing page {} does not exist, crawl complete", current);
                    break;
                }
            };

            let mut articles = match parse::extract_listing(&body, &self.base) {
                Ok(articles) => articles,
                Err(e) if current == start_page => return Err(e.into()),
                Err(e) => {
                    tracing::error!("Listing page {} is malformed, stopping: {}", current, e);
                    break;
                }
            };
            if let Some(cap) = self.config.crawler.articles_per_page {
                articles.truncate(cap);
            }
            if articles.is_empty() {
                tracing::info!("Listing page {} has no articles, crawl complete", current);
                break;
            }

            summary.listing_pages += 1;
            let article_count = articles.len();

            let mut tasks = JoinSet::new();
            for article in articles {
                self.dispatch(&mut tasks, article);
            }
            Self::drain(&mut tasks, &mut summary).await?;

            tracing::info!(
                "Listing page {} finished: {} articles in {:.1?}",
                current,
                article_count,
                started.elapsed()
            );

            if let Some(end) = self.config.crawler.end_page {
                if current >= end {
                    tracing::info!("Reached configured end page {}", end);
                    break;
                }
            }
            current += 1;
        }

        Ok(summary)
    }

    /// Archives an explicit set of article URLs, skipping the listing crawl
    ///
    /// Each URL goes through the same article pipeline and the same admission
    /// gate as a discovered article. No poster is known for a bare URL, and
    /// the category comes from the URL's leading path directory.
    pub async fn run_articles(&self, urls: &[String]) -> crate::Result<CrawlSummary> {
        let mut summary = CrawlSummary::default();

        let mut tasks = JoinSet::new();
        for raw in urls {
            let url = Url::parse(raw)?;
            self.dispatch(&mut tasks, parse::article_ref_from_url(&url));
        }
        Self::drain(&mut tasks, &mut summary).await?;

        Ok(summary)
    }

    /// Spawns one gated article processor onto the task set
    fn dispatch(
        &self,
        tasks: &mut JoinSet<crate::Result<Option<ArticleOutcome>>>,
        article: parse::ArticleRef,
    ) {
        let gate = self.gate.clone();
        let processor = self.processor.clone();
        tasks.spawn(async move {
            let Ok(_permit) = gate.acquire_owned().await else {
                return Ok(None);
            };
            processor.process(&article).await
        });
    }

    /// Awaits every spawned article and folds its outcome into the summary
    async fn drain(
        tasks: &mut JoinSet<crate::Result<Option<ArticleOutcome>>>,
        summary: &mut CrawlSummary,
    ) -> crate::Result<()> {
        while let Some(joined) = tasks.join_next().await {
            match joined? {
                Ok(Some(outcome)) => {
                    summary.articles_archived += 1;
                    summary.images_archived += outcome.success;
                    summary.images_failed += outcome.failed;
                }
                Ok(None) => summary.articles_skipped += 1,
                Err(e) => {
                    // Contained at the article boundary; siblings and the
                    // crawl itself keep going.
                    tracing::error!("Article aborted: {}", e);
                    summary.articles_skipped += 1;
                }
            }
        }
        Ok(())
    }

    /// Derives the URL of the Nth listing page
    ///
    /// Page 1 is the configured listing path itself. Later pages use the
    /// site's `index{N}.html` convention inside the listing directory: a
    /// trailing-slash path gets the index file appended, and a `.../name.html`
    /// path becomes `.../name/index{N}.html`.
    fn listing_url(&self, page: u32) -> crate::Result<String> {
        let path = &self.config.site.listing_path;

        if page <= 1 {
            return Ok(self.base.join(path)?.to_string());
        }

        let derived = if path.ends_with('/') {
            format!("{}index{}.html", path, page)
        } else {
            let stem = path.strip_suffix(".html").unwrap_or(path);
            format!("{}/index{}.html", stem, page)
        };
        Ok(self.base.join(&derived)?.to_string())
    }
}

/// Loads nothing, crawls everything: convenience wrapper around the driver
pub async fn run_crawl(config: Config) -> crate::Result<CrawlSummary> {
    let driver = CrawlDriver::new(config)?;
    driver.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, OutputConfig, SiteConfig};

    fn test_config(listing_path: &str) -> Config {
        Config {
            site: SiteConfig {
                base_url: "http://gallery.example".to_string(),
                listing_path: listing_path.to_string(),
            },
            crawler: CrawlerConfig {
                max_retries: 1,
                retry_delay_ms: 0,
                max_concurrent_articles: 2,
                max_retry_rounds: 1,
                page_batch_size: 30,
                articles_per_page: None,
                request_timeout_secs: 5,
                start_page: 1,
                end_page: None,
            },
            output: OutputConfig {
                root_dir: "./photos".to_string(),
            },
        }
    }

    #[test]
    fn test_listing_url_for_html_path() {
        let driver = CrawlDriver::new(test_config("/new.html")).unwrap();
        assert_eq!(
            driver.listing_url(1).unwrap(),
            "http://gallery.example/new.html"
        );
        assert_eq!(
            driver.listing_url(2).unwrap(),
            "http://gallery.example/new/index2.html"
        );
    }

    #[test]
    fn test_listing_url_for_directory_path() {
        let driver = CrawlDriver::new(test_config("/hot/")).unwrap();
        assert_eq!(driver.listing_url(1).unwrap(), "http://gallery.example/hot/");
        assert_eq!(
            driver.listing_url(3).unwrap(),
            "http://gallery.example/hot/index3.html"
        );
    }
}
