use std::fmt;
use std::time::Duration;

use url::Url;

use crate::keys::validate_container;
use crate::{Error, Result};

pub const RAW_CONTAINER: &str = "articles-data";
pub const SENTIMENT_CONTAINER: &str = "articles-sentiment";
pub const DEFAULT_HOMEPAGE: &str = "https://www.bbc.com/news";
pub const DEFAULT_LINK_PREFIX: &str = "/news/articles";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";
pub const MOCK_COUNT_CAP: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Containers {
    pub raw: String,
    pub sentiment: String,
}

impl Default for Containers {
    fn default() -> Self {
        Self {
            raw: RAW_CONTAINER.to_string(),
            sentiment: SENTIMENT_CONTAINER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub homepage: String,
    /// Only links whose path starts with this prefix are article candidates.
    pub link_prefix: String,
    pub max_candidates: usize,
    pub concurrency: usize,
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            homepage: DEFAULT_HOMEPAGE.to_string(),
            link_prefix: DEFAULT_LINK_PREFIX.to_string(),
            max_candidates: 10,
            concurrency: 4,
            fetch_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub default_count: usize,
    pub max_count: usize,
    pub concurrency: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            default_count: 10,
            max_count: MOCK_COUNT_CAP,
            concurrency: 16,
        }
    }
}

/// Process-wide configuration, built once at startup and handed to each
/// component.
#[derive(Clone)]
pub struct Config {
    pub connection_string: String,
    pub containers: Containers,
    pub scraper: ScraperConfig,
    pub mock: MockConfig,
    pub storage_timeout: Duration,
    pub invocation_timeout: Duration,
}

impl Config {
    pub fn new(connection_string: impl Into<String>) -> Result<Self> {
        let config = Self {
            connection_string: connection_string.into(),
            containers: Containers::default(),
            scraper: ScraperConfig::default(),
            mock: MockConfig::default(),
            storage_timeout: Duration::from_secs(30),
            invocation_timeout: Duration::from_secs(300),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.connection_string.trim().is_empty() {
            return Err(Error::Config("blob connection string is not set".to_string()));
        }
        validate_container(&self.containers.raw)?;
        validate_container(&self.containers.sentiment)?;
        if self.containers.raw == self.containers.sentiment {
            return Err(Error::Config(format!(
                "raw and sentiment containers must differ (both {:?})",
                self.containers.raw
            )));
        }
        Url::parse(&self.scraper.homepage)
            .map_err(|e| Error::Config(format!("invalid homepage URL {}: {}", self.scraper.homepage, e)))?;
        if self.scraper.concurrency == 0 || self.mock.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        if self.mock.max_count == 0 || self.mock.default_count == 0 || self.mock.default_count > self.mock.max_count {
            return Err(Error::Config(format!(
                "mock default count {} must be within 1..={}",
                self.mock.default_count, self.mock.max_count
            )));
        }
        for (name, value) in [
            ("fetch timeout", self.scraper.fetch_timeout),
            ("storage timeout", self.storage_timeout),
            ("invocation timeout", self.invocation_timeout),
        ] {
            if value.is_zero() {
                return Err(Error::Config(format!("{} must be non-zero", name)));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("connection_string", &"<redacted>")
            .field("containers", &self.containers)
            .field("scraper", &self.scraper)
            .field("mock", &self.mock)
            .field("storage_timeout", &self.storage_timeout)
            .field("invocation_timeout", &self.invocation_timeout)
            .finish()
    }
}
