//! Pictoria main entry point
//!
//! Command-line interface for the gallery archiver.

use clap::Parser;
use pictoria::config::load_config;
use pictoria::crawler::{run_crawl, CrawlDriver};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Pictoria: a pagination-aware gallery archiver
///
/// Walks a gallery site's listing pages, downloads every article's images
/// under bounded concurrency, normalizes them to JPEG, and writes one
/// metadata document per article. Re-runs resume where they left off.
#[derive(Parser, Debug)]
#[command(name = "pictoria")]
#[command(version)]
#[command(about = "A pagination-aware gallery archiver", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the configured start page
    #[arg(long, value_name = "N")]
    start_page: Option<u32>,

    /// Override the configured end page
    #[arg(long, value_name = "N")]
    end_page: Option<u32>,

    /// Archive one article URL directly, skipping the listing crawl
    /// (repeatable)
    #[arg(
        long = "article",
        value_name = "URL",
        conflicts_with_all = ["start_page", "end_page"]
    )]
    articles: Vec<String>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // CLI page bounds win over the config file, but must pass the same
    // range checks the file did
    if cli.start_page.is_some() || cli.end_page.is_some() {
        if let Some(start) = cli.start_page {
            config.crawler.start_page = start;
        }
        if let Some(end) = cli.end_page {
            config.crawler.end_page = Some(end);
        }
        if let Err(e) = pictoria::config::validate(&config) {
            tracing::error!("Invalid page bounds: {}", e);
            return Err(e.into());
        }
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    if !cli.articles.is_empty() {
        return handle_articles(config, cli.articles).await;
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pictoria=info,warn"),
            1 => EnvFilter::new("pictoria=debug,info"),
            2 => EnvFilter::new("pictoria=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &pictoria::Config) {
    println!("=== Pictoria Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Listing path: {}", config.site.listing_path);

    println!("\nCrawler:");
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);
    println!(
        "  Max concurrent articles: {}",
        config.crawler.max_concurrent_articles
    );
    println!("  Retry rounds: {}", config.crawler.max_retry_rounds);
    println!("  Page batch size: {}", config.crawler.page_batch_size);
    match config.crawler.articles_per_page {
        Some(cap) => println!("  Articles per page: {}", cap),
        None => println!("  Articles per page: unlimited"),
    }

    println!("\nPages:");
    println!("  Start page: {}", config.crawler.start_page);
    match config.crawler.end_page {
        Some(end) => println!("  End page: {}", end),
        None => println!("  End page: until exhaustion"),
    }

    println!("\nOutput:");
    println!("  Root directory: {}", config.output.root_dir);

    println!("\n✓ Configuration is valid");
}

/// Handles the direct-article mode: archives the given URLs, no listing walk
async fn handle_articles(config: pictoria::Config, urls: Vec<String>) -> anyhow::Result<()> {
    tracing::info!("Archiving {} directly-specified articles", urls.len());

    let driver = CrawlDriver::new(config)?;
    match driver.run_articles(&urls).await {
        Ok(summary) => {
            tracing::info!(
                "Done: {} articles archived ({} skipped), {} images archived, {} failed",
                summary.articles_archived,
                summary.articles_skipped,
                summary.images_archived,
                summary.images_failed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Archiving failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: pictoria::Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl of {} from page {}",
        config.site.base_url,
        config.crawler.start_page
    );

    match run_crawl(config).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl complete: {} listing pages, {} articles archived ({} skipped), {} images archived, {} failed",
                summary.listing_pages,
                summary.articles_archived,
                summary.articles_skipped,
                summary.images_archived,
                summary.images_failed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
