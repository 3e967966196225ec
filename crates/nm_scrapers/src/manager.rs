use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use nm_core::keys::key_from_url;
use nm_core::{with_deadline, BlobStore, Config, Error, Result};
use tracing::{error, info, warn};

use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::scrapers::{BbcScraper, Scraper};

#[derive(Debug)]
pub struct ScrapeFailure {
    pub url: String,
    pub error: Error,
}

/// Outcome of one scrape run.
#[derive(Debug)]
pub struct ScrapeReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub candidates: usize,
    /// Keys written to the raw container, sorted.
    pub written: Vec<String>,
    pub failures: Vec<ScrapeFailure>,
}

impl ScrapeReport {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

pub struct ScraperManager {
    store: Arc<dyn BlobStore>,
    fetcher: Arc<dyn PageFetcher>,
    scraper: Arc<dyn Scraper>,
    container: String,
    concurrency: usize,
    invocation_timeout: Duration,
}

impl ScraperManager {
    pub fn new(
        config: &Config,
        store: Arc<dyn BlobStore>,
        fetcher: Arc<dyn PageFetcher>,
        scraper: Arc<dyn Scraper>,
    ) -> Self {
        Self {
            store,
            fetcher,
            scraper,
            container: config.containers.raw.clone(),
            concurrency: config.scraper.concurrency.max(1),
            invocation_timeout: config.invocation_timeout,
        }
    }

    /// The production wiring: HTTP fetcher and BBC scraper.
    pub fn from_config(config: &Config, store: Arc<dyn BlobStore>) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config.scraper)?);
        let scraper = Arc::new(BbcScraper::new(&config.scraper)?);
        Ok(Self::new(config, store, fetcher, scraper))
    }

    /// Runs one scrape under the invocation budget. Only a homepage failure,
    /// a storage failure preparing the container or the budget running out
    /// fail the run; per-article failures are reported in the result.
    pub async fn run(&self) -> Result<ScrapeReport> {
        with_deadline(self.invocation_timeout, "scrape", self.scrape_all()).await
    }

    async fn scrape_all(&self) -> Result<ScrapeReport> {
        let started_at = Utc::now();
        let meta = self.scraper.source_metadata();
        info!("{} Scraping articles from {}", meta.emoji, meta.name);

        self.store.ensure_container(&self.container).await?;

        let homepage = self.scraper.homepage();
        let html = self.fetcher.fetch(homepage).await.map_err(|e| {
            error!(url = homepage, error = %e, "Failed to fetch homepage");
            e
        })?;
        let urls = self.scraper.extract_links(&html)?;
        info!(count = urls.len(), "🔗 Found article candidates");

        let candidates = urls.len();
        let results: Vec<(String, Result<String>)> = stream::iter(urls)
            .map(|url| async move {
                let result = self.scrape_url(&url).await;
                (url, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut written = Vec::new();
        let mut failures = Vec::new();
        for (url, result) in results {
            match result {
                Ok(key) => written.push(key),
                Err(error) => {
                    warn!(%url, kind = error.kind(), error = %error, "⏭️ Skipping article");
                    failures.push(ScrapeFailure { url, error });
                }
            }
        }
        written.sort();

        let report = ScrapeReport {
            started_at,
            finished_at: Utc::now(),
            candidates,
            written,
            failures,
        };
        info!(
            candidates = report.candidates,
            written = report.written.len(),
            failed = report.failures.len(),
            elapsed_ms = report.elapsed().num_milliseconds(),
            "✨ Scrape run finished"
        );
        Ok(report)
    }

    /// Fetches, parses and stores a single article, returning its key.
    pub async fn scrape_url(&self, url: &str) -> Result<String> {
        if !self.scraper.can_handle(url) {
            return Err(Error::Parse(format!("No scraper found for URL: {}", url)));
        }

        let html = self.fetcher.fetch(url).await?;
        let article = self.scraper.extract_article(url, &html)?;
        if article.content.is_empty() {
            warn!(url, "No content found for article");
        }

        let key = key_from_url(url)?;
        self.store.put(&self.container, &key, article.to_json()?).await?;
        info!(%key, title = %article.title, "📰 Stored article");
        Ok(key)
    }
}
