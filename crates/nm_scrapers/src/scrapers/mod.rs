use nm_core::{Article, Result};

pub mod bbc;

pub use bbc::BbcScraper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMetadata {
    pub name: &'static str,
    pub emoji: &'static str,
}

pub trait Scraper: Send + Sync {
    /// Returns the name and emoji of the news source
    fn source_metadata(&self) -> SourceMetadata;

    /// Returns the page article links are collected from
    fn homepage(&self) -> &str;

    /// Returns true if this scraper can handle the given URL
    fn can_handle(&self, url: &str) -> bool;

    /// Returns the article URLs linked from the homepage, de-duplicated
    fn extract_links(&self, html: &str) -> Result<Vec<String>>;

    /// Extracts an article from its page. A page without a title is an
    /// `Error::Parse`.
    fn extract_article(&self, url: &str, html: &str) -> Result<Article>;
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use nm_core::{Error, Result};
    use scraper::{ElementRef, Html, Selector};
    use url::Url;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::Parse(format!("Failed to parse URL {}: {}", url, e)))
    }

    pub fn selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector).map_err(|e| Error::Parse(format!("Invalid selector {}: {:?}", selector, e)))
    }

    /// Text of an element with whitespace runs collapsed to single spaces.
    pub fn element_text(element: ElementRef<'_>) -> String {
        element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn extract_text(document: &Html, selector: &str) -> Result<String> {
        let parsed = self::selector(selector)?;
        document
            .select(&parsed)
            .map(element_text)
            .find(|text| !text.is_empty())
            .ok_or_else(|| Error::Parse(format!("No text found for selector: {}", selector)))
    }

    pub fn extract_texts(document: &Html, selector: &str) -> Result<Vec<String>> {
        let parsed = self::selector(selector)?;
        Ok(document
            .select(&parsed)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::utils;
    use scraper::Html;

    #[test]
    fn test_parse_url() {
        assert!(utils::parse_url("https://example.com").is_ok());
        assert!(utils::parse_url("invalid-url").is_err());
    }

    #[test]
    fn test_extract_text() {
        let html = r#"
            <div class="title">  Test
                Title </div>
            <div class="content">Test Content</div>
        "#;
        let document = Html::parse_document(html);

        assert_eq!(utils::extract_text(&document, ".title").unwrap(), "Test Title");
        assert!(utils::extract_text(&document, ".invalid").is_err());
        assert!(utils::extract_text(&document, "[[[").is_err());
    }

    #[test]
    fn test_extract_texts() {
        let html = r#"
            <div class="item">Item 1</div>
            <div class="item">   </div>
            <div class="item">Item <b>2</b></div>
        "#;
        let document = Html::parse_document(html);

        let texts = utils::extract_texts(&document, ".item").unwrap();
        assert_eq!(texts, ["Item 1", "Item 2"]);
    }
}
