//! On-disk archive layout and per-article metadata documents
//!
//! Layout:
//! - `{root}/{category}/{title}/{position}.jpg` — position 0 is the poster,
//!   positions 1..=N are the gallery images in source order
//! - `{root}/{category}_metadata/{title}.json` — one metadata document per
//!   article, written once after every image reaches a terminal status
//!
//! The downstream publisher reads exactly this layout (numeric-ordered `.jpg`
//! files with `0.jpg` as the thumbnail), so filenames are part of the contract.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Per-article metadata document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub article_title: String,
    pub article_url: String,
    /// One record per position, ordered by position
    pub images: Vec<ImageRecord>,
}

/// Terminal record for one image position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    pub filename: String,
    pub status: ImageStatus,
}

/// Terminal status of one image
///
/// `Failed` covers both exhausted retries and 404s — the distinction lives in
/// the failure tally, not in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Success,
    Failed,
}

/// Directory holding an article's image files
pub fn article_dir(root: &Path, category: &str, title: &str) -> PathBuf {
    root.join(sanitize_component(category))
        .join(sanitize_component(title))
}

/// Directory holding a category's metadata documents
pub fn metadata_dir(root: &Path, category: &str) -> PathBuf {
    root.join(format!("{}_metadata", sanitize_component(category)))
}

/// Path of the metadata document for one article
pub fn metadata_path(root: &Path, category: &str, title: &str) -> PathBuf {
    metadata_dir(root, category).join(format!("{}.json", sanitize_component(title)))
}

/// File path for the image at the given position (0 = poster)
pub fn image_path(article_dir: &Path, position: u32) -> PathBuf {
    article_dir.join(format!("{}.jpg", position))
}

/// Strips characters that would break a title out of its path component
///
/// Titles come from page content, so separators and NULs cannot be trusted.
pub fn sanitize_component(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .collect();

    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}

/// Writes the metadata document, pretty-printed UTF-8 JSON
pub async fn write_metadata(path: &Path, metadata: &ArticleMetadata) -> crate::Result<()> {
    let document = serde_json::to_string_pretty(metadata)?;
    tokio::fs::write(path, document).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let root = Path::new("/archive");
        assert_eq!(
            article_dir(root, "Taste", "gallery one"),
            PathBuf::from("/archive/Taste/gallery one")
        );
        assert_eq!(
            metadata_path(root, "Taste", "gallery one"),
            PathBuf::from("/archive/Taste_metadata/gallery one.json")
        );
    }

    #[test]
    fn test_image_path_positions() {
        let dir = Path::new("/archive/Taste/g");
        assert_eq!(image_path(dir, 0), PathBuf::from("/archive/Taste/g/0.jpg"));
        assert_eq!(image_path(dir, 12), PathBuf::from("/archive/Taste/g/12.jpg"));
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("a/b\\c"), "abc");
        assert_eq!(sanitize_component("///"), "untitled");
        assert_eq!(sanitize_component("无恙写真"), "无恙写真");
    }

    #[test]
    fn test_metadata_document_shape() {
        let metadata = ArticleMetadata {
            article_title: "t".to_string(),
            article_url: "http://gallery.example/Taste/1.html".to_string(),
            images: vec![
                ImageRecord {
                    url: "http://gallery.example/p/0.webp".to_string(),
                    filename: "0.jpg".to_string(),
                    status: ImageStatus::Success,
                },
                ImageRecord {
                    url: "http://gallery.example/p/1.webp".to_string(),
                    filename: "1.jpg".to_string(),
                    status: ImageStatus::Failed,
                },
            ],
        };

        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["article_title"], "t");
        assert_eq!(value["images"][0]["filename"], "0.jpg");
        assert_eq!(value["images"][0]["status"], "success");
        assert_eq!(value["images"][1]["status"], "failed");
    }

    #[tokio::test]
    async fn test_write_metadata_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("article.json");

        let metadata = ArticleMetadata {
            article_title: "gallery".to_string(),
            article_url: "http://gallery.example/a.html".to_string(),
            images: vec![],
        };

        write_metadata(&path, &metadata).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let loaded: ArticleMetadata = serde_json::from_str(&raw).unwrap();
        assert_eq!(loaded.article_title, "gallery");
        // Pretty-printed, human-readable output
        assert!(raw.contains('\n'));
    }
}
