use std::future::Future;
use std::time::Duration;

pub mod config;
pub mod error;
pub mod keys;
pub mod models;
pub mod storage;
pub mod types;

pub use config::{Config, Containers, MockConfig, ScraperConfig};
pub use error::{Error, Result};
pub use models::{Sentiment, SentimentScorer};
pub use storage::{BlobEvent, BlobStore};
pub use types::{AnnotatedArticle, Article};

/// Runs one invocation under a wall-clock budget. Exceeding the budget fails
/// the invocation with `Error::Timeout`.
pub async fn with_deadline<T, F>(budget: Duration, invocation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(invocation, ?budget, "⏱️ Invocation timed out");
            Err(Error::Timeout {
                invocation: invocation.to_string(),
                budget,
            })
        }
    }
}

pub mod prelude {
    pub use super::{with_deadline, AnnotatedArticle, Article, BlobEvent, BlobStore, Config, Error, Result, Sentiment, SentimentScorer};
}
