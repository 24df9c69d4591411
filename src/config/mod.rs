//! Configuration loading and validation
//!
//! Configuration comes from a TOML file with three sections:
//! - `[site]` — site root and listing page path
//! - `[crawler]` — retry, timeout, and concurrency knobs
//! - `[output]` — where the archive tree is written

pub mod parser;
pub mod types;
pub mod validation;

pub use parser::load_config;
pub use types::{Config, CrawlerConfig, OutputConfig, SiteConfig};
pub use validation::validate;
