use async_trait::async_trait;
use nm_core::{Error, Result, ScraperConfig};
use reqwest::Client;
use tracing::debug;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the body of the page at `url`. Transport failures and non-2xx
    /// responses are `Error::Fetch`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Fetch(format!("{}: {}", url, e)))?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("{}: {}", url, e)))?;
        debug!(url, bytes = body.len(), "🌐 Fetched page");
        Ok(body)
    }
}
