//! Site markup contract
//!
//! Pure functions over HTML text for one specific gallery site:
//! - listing pages: `ul.update_area_lists` holding `li.i_list` article entries
//! - article pages: gallery images under `/uploadfile/` paths, a `div.page`
//!   pagination control, and a `<title>` carrying the article name
//!
//! The selectors and cleanup strings here mirror the site's markup exactly and
//! are a contract with that site, not an algorithm. Nothing in this module
//! performs I/O.

pub mod article;
pub mod listing;

pub use article::{extract_image_urls, extract_title, pagination_labels};
pub use listing::{article_ref_from_url, extract_listing, ArticleRef};

/// Category used when a page carries no recognizable category label
pub const DEFAULT_CATEGORY: &str = "default";
