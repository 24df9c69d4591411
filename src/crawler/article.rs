//! Per-article processing
//!
//! One processor run takes an article reference through the full pipeline:
//! first-page fetch, title and category resolution, pagination resolution,
//! ordered image collection, concurrent materialization with bounded retry
//! rounds, and a single metadata write once every position is terminal.
//!
//! Articles are independent: a failure here never affects siblings, and the
//! only shared state is the connection pool and the driver's admission gate.

use crate::archive::{self, ArticleMetadata, ImageRecord, ImageStatus};
use crate::config::Config;
use crate::crawler::materializer::{DownloadOutcome, ImageMaterializer};
use crate::crawler::paginator;
use crate::fetch::{FetchOutcome, PageFetcher};
use crate::parse::{self, ArticleRef};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// Counters from one completed article
#[derive(Debug, Clone)]
pub struct ArticleOutcome {
    pub title: String,
    pub category: String,
    pub total_pages: u32,
    /// Images on disk (downloaded now or found from a previous run)
    pub success: usize,
    /// Images that exhausted every retry round
    pub failed: usize,
    /// Images whose source is gone; excluded from the failure tally
    pub not_found: usize,
}

/// Processes one article end to end
#[derive(Clone)]
pub struct ArticleProcessor {
    fetcher: PageFetcher,
    materializer: ImageMaterializer,
    config: Arc<Config>,
    base: Url,
}

impl ArticleProcessor {
    pub fn new(
        fetcher: PageFetcher,
        materializer: ImageMaterializer,
        config: Arc<Config>,
        base: Url,
    ) -> Self {
        Self {
            fetcher,
            materializer,
            config,
            base,
        }
    }

    /// Runs the pipeline for one article
    ///
    /// Returns `Ok(None)` when the article is skipped whole (first page
    /// unavailable, or no images found) — in both cases no metadata is
    /// written, so a skipped article is indistinguishable from an unvisited
    /// one on the next run. Structural parse errors propagate to the caller.
    pub async fn process(&self, article: &ArticleRef) -> crate::Result<Option<ArticleOutcome>> {
        let body = match self.fetcher.fetch_page(&article.article_url).await {
            FetchOutcome::Content(body) => body,
            _ => {
                tracing::warn!("Article page unavailable, skipping: {}", article.article_url);
                return Ok(None);
            }
        };

        let (title, category) = parse::extract_title(&body, &article.category_path)?;
        let total_pages = paginator::resolve_page_count(&parse::pagination_labels(&body));

        let image_urls = paginator::collect_image_urls(
            &self.fetcher,
            &self.base,
            &article.article_url,
            total_pages,
            self.config.crawler.page_batch_size,
        )
        .await;

        if image_urls.is_empty() {
            tracing::warn!("{} {}: no images found", title, article.article_url);
            return Ok(None);
        }

        let root = Path::new(&self.config.output.root_dir);
        let dir = archive::article_dir(root, &category, &title);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::create_dir_all(archive::metadata_dir(root, &category)).await?;

        // Position table: 0 is the poster (when the listing gave one),
        // 1..=N are the gallery images in source order.
        let mut positions: Vec<(u32, String)> = Vec::new();
        if let Some(poster_url) = &article.poster_url {
            positions.push((0, poster_url.clone()));
        }
        for (index, url) in image_urls.iter().enumerate() {
            positions.push((index as u32 + 1, url.clone()));
        }

        // Idempotent resume: a position whose file exists is terminal before
        // any network traffic happens.
        let mut statuses: BTreeMap<u32, ImageStatus> = BTreeMap::new();
        let mut pending: Vec<(u32, String)> = Vec::new();
        for (position, url) in &positions {
            if archive::image_path(&dir, *position).exists() {
                statuses.insert(*position, ImageStatus::Success);
            } else {
                pending.push((*position, url.clone()));
            }
        }

        let mut not_found = 0usize;

        // Round 0 downloads everything pending; each later round re-dispatches
        // the previous round's failures as a fresh concurrent batch. NotFound
        // drops out permanently. A clean round ends the loop early; the round
        // bound keeps a permanently broken source from spinning forever.
        for round in 0..=self.config.crawler.max_retry_rounds {
            if pending.is_empty() {
                break;
            }
            if round > 0 {
                tracing::info!(
                    "{}: retrying {} failed images (round {})",
                    title,
                    pending.len(),
                    round
                );
            }

            let mut tasks = JoinSet::new();
            for (position, url) in pending.drain(..) {
                let materializer = self.materializer.clone();
                let target = archive::image_path(&dir, position);
                tasks.spawn(async move {
                    let outcome = materializer.materialize(&url, &target).await;
                    (position, url, outcome)
                });
            }

            let mut failures = Vec::new();
            while let Some(joined) = tasks.join_next().await {
                let (position, url, outcome) = joined?;
                match outcome {
                    DownloadOutcome::Success => {
                        statuses.insert(position, ImageStatus::Success);
                    }
                    DownloadOutcome::NotFound => {
                        statuses.insert(position, ImageStatus::Failed);
                        not_found += 1;
                    }
                    DownloadOutcome::Failed => failures.push((position, url)),
                }
            }
            pending = failures;
        }

        // Whatever survived every round is terminally failed.
        let failed = pending.len();
        for (position, _) in &pending {
            statuses.insert(*position, ImageStatus::Failed);
        }

        let metadata = ArticleMetadata {
            article_title: title.clone(),
            article_url: article.article_url.clone(),
            images: positions
                .iter()
                .map(|(position, url)| ImageRecord {
                    url: url.clone(),
                    filename: format!("{}.jpg", position),
                    status: statuses
                        .get(position)
                        .copied()
                        .unwrap_or(ImageStatus::Failed),
                })
                .collect(),
        };
        archive::write_metadata(&archive::metadata_path(root, &category, &title), &metadata)
            .await?;

        let success = statuses
            .values()
            .filter(|status| **status == ImageStatus::Success)
            .count();

        if failed > 0 || not_found > 0 {
            tracing::info!(
                "{} {} [{} pages]: {} images archived, {} failed, {} gone",
                title,
                article.article_url,
                total_pages,
                success,
                failed,
                not_found
            );
        } else {
            tracing::info!(
                "{} {} [{} pages]: {} images archived",
                title,
                article.article_url,
                total_pages,
                success
            );
        }

        Ok(Some(ArticleOutcome {
            title,
            category,
            total_pages,
            success,
            failed,
            not_found,
        }))
    }
}
