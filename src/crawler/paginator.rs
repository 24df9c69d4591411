//! Article pagination: page-count resolution and ordered image collection
//!
//! An article spreads its gallery over sub-pages. The count comes from the
//! article's pagination control; sub-page URLs derive from the article URL;
//! and collection fetches sub-pages in bounded batches, tagging every unit of
//! work with its page index so the final sequence reflects source order no
//! matter how concurrent fetches interleave.

use crate::fetch::{FetchOutcome, PageFetcher};
use crate::parse;
use std::collections::BTreeMap;
use tokio::task::JoinSet;
use url::Url;

/// Resolves an article's total sub-page count from its pagination labels
///
/// Site contract: the last link in the control is "next page" and is not
/// numeric, so with more than one link the second-to-last label is the page
/// count. An absent control or a single link means a one-page article. A
/// non-numeric label in that slot also falls back to one page.
pub fn resolve_page_count(labels: &[String]) -> u32 {
    if labels.len() > 1 {
        labels[labels.len() - 2].parse().unwrap_or(1)
    } else {
        1
    }
}

/// Derives the URL of an article's sub-page
///
/// Page 0 is the article's own URL; page N strips the extension and appends
/// `_N` before putting the extension back: `/Taste/1.html` -> `/Taste/1_2.html`.
pub fn sub_page_url(article_url: &str, page_index: u32) -> String {
    if page_index == 0 {
        return article_url.to_string();
    }

    match article_url.rsplit_once('.') {
        Some((stem, extension)) => format!("{}_{}.{}", stem, page_index, extension),
        None => format!("{}_{}", article_url, page_index),
    }
}

/// Collects an article's image URLs across all sub-pages, in source order
///
/// Sub-pages are fetched in batches of `min(batch_cap, total_pages)`; within a
/// batch fetches run concurrently and results are reassembled by page index.
/// A page that yields zero image URLs ends collection early — the pagination
/// count overshot the real content. Unreachable pages are skipped.
pub async fn collect_image_urls(
    fetcher: &PageFetcher,
    base: &Url,
    article_url: &str,
    total_pages: u32,
    batch_cap: u32,
) -> Vec<String> {
    let batch_size = batch_cap.clamp(1, total_pages.max(1));

    let mut urls = Vec::new();
    let mut next_page = 0u32;

    'batches: while next_page < total_pages {
        let mut tasks = JoinSet::new();
        for _ in 0..batch_size {
            if next_page >= total_pages {
                break;
            }
            let page_url = sub_page_url(article_url, next_page);
            let fetcher = fetcher.clone();
            let index = next_page;
            tasks.spawn(async move { (index, fetcher.fetch_page(&page_url).await) });
            next_page += 1;
        }

        // Scatter-gather: reassemble by page index, not completion order
        let mut batch: BTreeMap<u32, FetchOutcome> = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            if let Ok((index, outcome)) = joined {
                batch.insert(index, outcome);
            }
        }

        for (index, outcome) in batch {
            let body = match outcome.into_content() {
                Some(body) => body,
                None => continue,
            };

            let page_urls = parse::extract_image_urls(&body, base);
            if page_urls.is_empty() {
                tracing::debug!(
                    "Sub-page {} of {} has no images, stopping collection",
                    index,
                    article_url
                );
                break 'batches;
            }
            urls.extend(page_urls);
        }
    }

    urls
}
