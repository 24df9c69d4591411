//! Listing page parsing: article references with optional posters

use crate::ParseError;
use scraper::{Html, Selector};
use url::Url;

/// One article discovered on a listing page
///
/// Ephemeral: produced here, consumed immediately by the article processor.
#[derive(Debug, Clone)]
pub struct ArticleRef {
    /// Absolute URL of the article's first page
    pub article_url: String,

    /// Absolute URL of the article's representative image, when present
    pub poster_url: Option<String>,

    /// Leading directory of the article path, e.g. "/Taste/"
    ///
    /// The article page links back to this path; its link text is the
    /// category label used for the output directory.
    pub category_path: String,
}

/// Extracts article references from a listing page, in document order
///
/// The listing region (`ul.update_area_lists`) is mandatory: a listing page
/// without it is structurally broken and aborts that page. Entries missing an
/// `<a href>` are likewise structural errors. A missing poster image is normal.
pub fn extract_listing(html: &str, base: &Url) -> Result<Vec<ArticleRef>, ParseError> {
    let document = Html::parse_document(html);

    let region_selector =
        Selector::parse("ul.update_area_lists").map_err(|_| ParseError::MissingListingRegion)?;
    let region = document
        .select(&region_selector)
        .next()
        .ok_or(ParseError::MissingListingRegion)?;

    let entry_selector =
        Selector::parse("li.i_list").map_err(|_| ParseError::MissingListingRegion)?;
    let link_selector = Selector::parse("a").map_err(|_| ParseError::MissingArticleLink)?;
    let poster_selector = Selector::parse("img.waitpic").ok();

    let mut articles = Vec::new();
    for entry in region.select(&entry_selector) {
        let href = entry
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or(ParseError::MissingArticleLink)?;

        let article_url = resolve(base, href)?;
        let category_path = leading_directory(href);

        let poster_url = match &poster_selector {
            Some(selector) => entry
                .select(selector)
                .next()
                .and_then(|img| img.value().attr("src"))
                .filter(|src| !src.is_empty())
                .map(|src| resolve(base, src))
                .transpose()?,
            None => None,
        };

        articles.push(ArticleRef {
            article_url,
            poster_url,
            category_path,
        });
    }

    Ok(articles)
}

/// Builds an article reference from a bare article URL
///
/// Used when article URLs are supplied directly instead of discovered on a
/// listing page: no poster is known, and the category path is the URL's
/// leading path directory.
pub fn article_ref_from_url(url: &Url) -> ArticleRef {
    ArticleRef {
        article_url: url.to_string(),
        poster_url: None,
        category_path: leading_directory(url.path()),
    }
}

/// Resolves an href against the site base
fn resolve(base: &Url, href: &str) -> Result<String, ParseError> {
    base.join(href)
        .map(|u| u.to_string())
        .map_err(|e| ParseError::BadHref {
            href: href.to_string(),
            message: e.to_string(),
        })
}

/// Returns the leading directory of a path like "/Taste/16708.html" -> "/Taste/"
fn leading_directory(href: &str) -> String {
    let trimmed = href.strip_prefix('/').unwrap_or(href);
    match trimmed.find('/') {
        Some(pos) => format!("/{}", &trimmed[..pos + 1]),
        None => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://gallery.example").unwrap()
    }

    const LISTING: &str = r#"
        <html><body>
        <ul class="update_area_lists cl">
            <li class="i_list list_n2">
                <a href="/Taste/16708.html"><img class="waitpic" src="/uploadfile/posters/16708.jpg"></a>
            </li>
            <li class="i_list list_n2">
                <a href="/MyGirl/552.html"></a>
            </li>
        </ul>
        </body></html>
    "#;

    #[test]
    fn test_extract_articles_in_order() {
        let articles = extract_listing(LISTING, &base()).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(
            articles[0].article_url,
            "http://gallery.example/Taste/16708.html"
        );
        assert_eq!(
            articles[1].article_url,
            "http://gallery.example/MyGirl/552.html"
        );
    }

    #[test]
    fn test_poster_is_optional() {
        let articles = extract_listing(LISTING, &base()).unwrap();
        assert_eq!(
            articles[0].poster_url.as_deref(),
            Some("http://gallery.example/uploadfile/posters/16708.jpg")
        );
        assert_eq!(articles[1].poster_url, None);
    }

    #[test]
    fn test_category_path() {
        let articles = extract_listing(LISTING, &base()).unwrap();
        assert_eq!(articles[0].category_path, "/Taste/");
        assert_eq!(articles[1].category_path, "/MyGirl/");
    }

    #[test]
    fn test_missing_region_is_structural() {
        let html = "<html><body><p>nothing here</p></body></html>";
        let result = extract_listing(html, &base());
        assert!(matches!(result, Err(ParseError::MissingListingRegion)));
    }

    #[test]
    fn test_entry_without_link_is_structural() {
        let html = r#"
            <ul class="update_area_lists">
                <li class="i_list"><span>broken entry</span></li>
            </ul>
        "#;
        let result = extract_listing(html, &base());
        assert!(matches!(result, Err(ParseError::MissingArticleLink)));
    }

    #[test]
    fn test_article_ref_from_bare_url() {
        let url = Url::parse("http://gallery.example/Taste/16708.html").unwrap();
        let article = article_ref_from_url(&url);
        assert_eq!(
            article.article_url,
            "http://gallery.example/Taste/16708.html"
        );
        assert_eq!(article.poster_url, None);
        assert_eq!(article.category_path, "/Taste/");
    }

    #[test]
    fn test_empty_listing_region() {
        let html = r#"<ul class="update_area_lists"></ul>"#;
        let articles = extract_listing(html, &base()).unwrap();
        assert!(articles.is_empty());
    }
}
