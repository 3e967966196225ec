pub mod fetcher;
pub mod manager;
pub mod scrapers;

pub use fetcher::{HttpFetcher, PageFetcher};
pub use manager::{ScrapeFailure, ScrapeReport, ScraperManager};
pub use scrapers::{BbcScraper, Scraper, SourceMetadata};

pub mod prelude {
    pub use super::fetcher::PageFetcher;
    pub use super::manager::ScraperManager;
    pub use super::scrapers::Scraper;
    pub use nm_core::{Article, Error, Result};
}
