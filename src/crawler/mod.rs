//! The crawl-and-download pipeline
//!
//! Leaves first:
//! - [`paginator`] resolves an article's sub-page count and collects its
//!   image URLs in source order
//! - [`materializer`] downloads one image and writes a normalized JPEG
//! - [`article`] orchestrates one article: pagination, ordered collection,
//!   concurrent materialization, retry rounds, metadata persistence
//! - [`driver`] walks listing pages and dispatches article processors under
//!   a global admission gate

pub mod article;
pub mod driver;
pub mod materializer;
pub mod paginator;

pub use article::{ArticleOutcome, ArticleProcessor};
pub use driver::{run_crawl, CrawlDriver, CrawlSummary};
pub use materializer::{DownloadOutcome, ImageMaterializer};
pub use paginator::{collect_image_urls, resolve_page_count, sub_page_url};
