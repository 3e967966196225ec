use std::collections::HashSet;

use nm_core::{Article, Error, Result, ScraperConfig};
use scraper::Html;
use url::Url;

use super::utils;
use super::{Scraper, SourceMetadata};

/// Scrapes article pages linked from the BBC News homepage.
#[derive(Debug, Clone)]
pub struct BbcScraper {
    homepage: Url,
    link_prefix: String,
    max_candidates: usize,
}

impl BbcScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            homepage: utils::parse_url(&config.homepage)?,
            link_prefix: config.link_prefix.clone(),
            max_candidates: config.max_candidates,
        })
    }

    /// Resolves `href` against the homepage and keeps it only if it points
    /// at an article on the same host.
    fn candidate(&self, href: &str) -> Option<String> {
        let mut url = self.homepage.join(href.trim()).ok()?;
        if url.host_str() != self.homepage.host_str() || !url.path().starts_with(&self.link_prefix) {
            return None;
        }
        url.set_query(None);
        url.set_fragment(None);
        Some(url.to_string())
    }
}

impl Scraper for BbcScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: "BBC News",
            emoji: "📺",
        }
    }

    fn homepage(&self) -> &str {
        self.homepage.as_str()
    }

    fn can_handle(&self, url: &str) -> bool {
        Url::parse(url)
            .map(|u| u.host_str() == self.homepage.host_str())
            .unwrap_or(false)
    }

    fn extract_links(&self, html: &str) -> Result<Vec<String>> {
        let document = Html::parse_document(html);
        let anchors = utils::selector("a[href]")?;

        let mut seen = HashSet::new();
        let urls = document
            .select(&anchors)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| self.candidate(href))
            .filter(|url| seen.insert(url.clone()))
            .take(self.max_candidates)
            .collect();
        Ok(urls)
    }

    fn extract_article(&self, url: &str, html: &str) -> Result<Article> {
        let document = Html::parse_document(html);

        let title = utils::extract_text(&document, "h1")
            .map_err(|_| Error::Parse(format!("No title found for article {}", url)))?;
        let content = utils::extract_texts(&document, "article p")?.join(" ");

        Ok(Article::new(title, content, url))
    }
}
