//! Article page parsing: title, gallery images, pagination labels

use crate::parse::DEFAULT_CATEGORY;
use crate::ParseError;
use scraper::{Html, Selector};
use url::Url;

/// Site suffix trimmed off every article title
const TITLE_SUFFIX: &str = " - - XiuRen";

/// Extracts the gallery image URLs embedded on one sub-page, in document order
///
/// The site marks gallery images three ways at once: the `src` sits under
/// `/uploadfile/` (either casing), and both `alt` and `title` attributes are
/// populated. Anything else (navigation sprites, ads, posters of other
/// articles) fails at least one of those checks.
pub fn extract_image_urls(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    let img_selector = match Selector::parse("img") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut urls = Vec::new();
    for img in document.select(&img_selector) {
        let element = img.value();
        let src = match element.attr("src") {
            Some(src) => src,
            None => continue,
        };

        if !src.starts_with("/uploadfile/") && !src.starts_with("/UploadFile/") {
            continue;
        }
        if element.attr("alt").map_or(true, str::is_empty)
            || element.attr("title").map_or(true, str::is_empty)
        {
            continue;
        }

        if let Ok(url) = base.join(src) {
            urls.push(url.to_string());
        }
    }

    urls
}

/// Derives the article title and category label from an article's first page
///
/// The category label is the text of the link pointing back at the listing
/// directory (`category_path`); when that link is absent the default category
/// is used. The title comes from `<title>`, with the site suffix and the
/// `"{category}第"` serial prefix stripped. A page without a `<title>` is
/// structurally broken and aborts the article.
pub fn extract_title(html: &str, category_path: &str) -> Result<(String, String), ParseError> {
    let document = Html::parse_document(html);

    let category = Selector::parse(&format!("a[href=\"{}\"]", category_path))
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|a| a.text().collect::<String>().trim().to_string())
        })
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    let title_selector = Selector::parse("title").map_err(|_| ParseError::MissingTitle)?;
    let raw_title = document
        .select(&title_selector)
        .next()
        .map(|t| t.text().collect::<String>())
        .ok_or(ParseError::MissingTitle)?;

    let serial_prefix = format!("{}第", category);
    let title = raw_title
        .trim()
        .replace(TITLE_SUFFIX, "")
        .replace(&serial_prefix, "")
        .trim()
        .to_string();

    if title.is_empty() {
        return Err(ParseError::MissingTitle);
    }

    Ok((title, category))
}

/// Returns the label of every link inside the pagination control, in order
///
/// An absent `div.page` region yields an empty list, which the resolver treats
/// as a single-page article.
pub fn pagination_labels(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let link_selector = match Selector::parse("div.page a") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&link_selector)
        .map(|a| a.text().collect::<String>().trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://gallery.example").unwrap()
    }

    #[test]
    fn test_extract_image_urls_in_order() {
        let html = r#"
            <img src="/uploadfile/a/1.webp" alt="p1" title="p1">
            <img src="/UploadFile/a/2.webp" alt="p2" title="p2">
            <img src="/uploadfile/a/3.webp" alt="p3" title="p3">
        "#;
        let urls = extract_image_urls(html, &base());
        assert_eq!(
            urls,
            vec![
                "http://gallery.example/uploadfile/a/1.webp",
                "http://gallery.example/UploadFile/a/2.webp",
                "http://gallery.example/uploadfile/a/3.webp",
            ]
        );
    }

    #[test]
    fn test_image_filter_requires_all_markers() {
        let html = r#"
            <img src="/uploadfile/a/1.webp" alt="p1" title="p1">
            <img src="/uploadfile/a/no-alt.webp" title="x">
            <img src="/uploadfile/a/no-title.webp" alt="x">
            <img src="/static/logo.png" alt="logo" title="logo">
            <img alt="no-src" title="no-src">
        "#;
        let urls = extract_image_urls(html, &base());
        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn test_extract_title_strips_site_suffix() {
        let html = r#"
            <html><head><title>Taste第100期某某写真 - - XiuRen</title></head>
            <body><a href="/Taste/">Taste</a></body></html>
        "#;
        let (title, category) = extract_title(html, "/Taste/").unwrap();
        assert_eq!(category, "Taste");
        assert_eq!(title, "100期某某写真");
    }

    #[test]
    fn test_extract_title_without_category_link() {
        let html = r#"<html><head><title>Standalone Gallery</title></head><body></body></html>"#;
        let (title, category) = extract_title(html, "/Taste/").unwrap();
        assert_eq!(category, DEFAULT_CATEGORY);
        assert_eq!(title, "Standalone Gallery");
    }

    #[test]
    fn test_missing_title_is_structural() {
        let html = "<html><head></head><body></body></html>";
        let result = extract_title(html, "/Taste/");
        assert!(matches!(result, Err(ParseError::MissingTitle)));
    }

    #[test]
    fn test_pagination_labels() {
        let html = r#"
            <div class="page">
                <a href="a.html">1</a>
                <a href="a_1.html">2</a>
                <a href="a_2.html">3</a>
                <a href="a_1.html">下页</a>
            </div>
        "#;
        assert_eq!(pagination_labels(html), vec!["1", "2", "3", "下页"]);
    }

    #[test]
    fn test_pagination_labels_absent_region() {
        assert!(pagination_labels("<html><body></body></html>").is_empty());
    }
}
