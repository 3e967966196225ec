use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use nm_core::keys::mock_key;
use nm_core::{with_deadline, Article, BlobStore, Config, Error, MockConfig, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

pub const MOCK_URL_BASE: &str = "https://mock.newsmood.invalid/articles/";

const SUBJECTS: &[&str] = &[
    "The council", "Local residents", "The government", "Researchers", "Investors",
    "The team", "Officials", "Shoppers", "Farmers", "The hospital",
];

const POSITIVE: &[&str] = &[
    "great", "excellent", "wonderful", "happy", "successful", "strong", "hopeful", "good",
];

const NEGATIVE: &[&str] = &[
    "terrible", "bad", "awful", "sad", "disappointing", "weak", "worst", "angry",
];

const NEUTRAL: &[&str] = &[
    "annual", "regional", "scheduled", "quarterly", "new", "local", "official", "weekly",
];

const NOUNS: &[&str] = &[
    "results", "figures", "plans", "weather", "talks", "season", "report", "harvest",
];

const VERBS: &[&str] = &["announced", "described", "reported", "expected", "welcomed", "criticised"];

/// Outcome of one mock request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MockReport {
    pub requested: usize,
    pub written: usize,
    pub failed: usize,
}

/// Writes synthetic articles into the raw container to load the annotation
/// path.
pub struct MockGenerator {
    store: Arc<dyn BlobStore>,
    container: String,
    config: MockConfig,
    invocation_timeout: Duration,
}

impl MockGenerator {
    pub fn new(config: &Config, store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            container: config.containers.raw.clone(),
            config: config.mock.clone(),
            invocation_timeout: config.invocation_timeout,
        }
    }

    /// Resolves a requested count: missing means the default, anything
    /// outside `1..=max_count` is rejected.
    pub fn validate_count(&self, requested: Option<i64>) -> Result<usize> {
        let Some(count) = requested else {
            return Ok(self.config.default_count);
        };
        if count <= 0 {
            return Err(Error::Validation(format!("count must be positive, got {}", count)));
        }
        match usize::try_from(count) {
            Ok(count) if count <= self.config.max_count => Ok(count),
            _ => Err(Error::Validation(format!(
                "count must be at most {}, got {}",
                self.config.max_count, count
            ))),
        }
    }

    /// Builds `count` articles with fresh keys.
    pub fn fabricate(&self, count: usize) -> Vec<(String, Article)> {
        let mut rng = rand::thread_rng();
        (0..count)
            .map(|_| {
                let id = Uuid::new_v4();
                let article = Article::new(title(&mut rng), content(&mut rng), format!("{}{}", MOCK_URL_BASE, id));
                (mock_key(id), article)
            })
            .collect()
    }

    pub async fn generate(&self, count: usize) -> Result<MockReport> {
        with_deadline(self.invocation_timeout, "generate", self.write_all(count)).await
    }

    async fn write_all(&self, count: usize) -> Result<MockReport> {
        self.store.ensure_container(&self.container).await?;

        let articles = self.fabricate(count);
        let written = stream::iter(articles)
            .map(|(key, article)| async move {
                let result = match article.to_json() {
                    Ok(bytes) => self.store.put(&self.container, &key, bytes).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = &result {
                    warn!(%key, kind = e.kind(), error = %e, "Failed to write mock article");
                }
                result.is_ok()
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect::<Vec<bool>>()
            .await
            .into_iter()
            .filter(|ok| *ok)
            .count();

        let report = MockReport {
            requested: count,
            written,
            failed: count - written,
        };
        info!(
            requested = report.requested,
            written = report.written,
            failed = report.failed,
            "🧪 Generated mock articles in {}",
            self.container
        );
        Ok(report)
    }
}

fn pick<'a, R: Rng>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words.choose(rng).copied().unwrap_or_default()
}

/// A tone word drawn from the positive, negative or neutral list.
fn tone<R: Rng>(rng: &mut R) -> &'static str {
    let list = match rng.gen_range(0..3) {
        0 => POSITIVE,
        1 => NEGATIVE,
        _ => NEUTRAL,
    };
    pick(rng, list)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn title<R: Rng>(rng: &mut R) -> String {
    format!("{} {} {}", capitalize(tone(rng)), pick(rng, NOUNS), pick(rng, VERBS))
}

fn content<R: Rng>(rng: &mut R) -> String {
    let sentences = rng.gen_range(3..=6);
    (0..sentences)
        .map(|_| {
            format!(
                "{} {} {} {} {}.",
                pick(rng, SUBJECTS),
                pick(rng, VERBS),
                pick(rng, &["the", "a", "this"]),
                tone(rng),
                pick(rng, NOUNS)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nm_core::keys::{validate_key, MOCK_KEY_PREFIX};
    use nm_storage::MemoryStorage;
    use std::collections::HashSet;

    fn generator(memory: &MemoryStorage) -> MockGenerator {
        let config = Config::new("memory://").unwrap();
        MockGenerator::new(&config, Arc::new(memory.clone()))
    }

    #[test]
    fn test_validate_count() {
        let generator = generator(&MemoryStorage::new());
        assert_eq!(generator.validate_count(None).unwrap(), 10);
        assert_eq!(generator.validate_count(Some(1)).unwrap(), 1);
        assert_eq!(generator.validate_count(Some(10_000)).unwrap(), 10_000);
        for bad in [0, -1, 10_001, i64::MAX] {
            assert!(matches!(generator.validate_count(Some(bad)), Err(Error::Validation(_))));
        }
    }

    #[test]
    fn test_fabricate() {
        let generator = generator(&MemoryStorage::new());
        let articles = generator.fabricate(50);
        assert_eq!(articles.len(), 50);

        let keys: HashSet<&str> = articles.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys.len(), 50);

        for (key, article) in &articles {
            assert!(key.starts_with(MOCK_KEY_PREFIX));
            validate_key(key).unwrap();
            assert!(!article.title.is_empty());
            assert!(!article.content.is_empty());
            assert_eq!(article.url, format!("{}{}", MOCK_URL_BASE, &key[MOCK_KEY_PREFIX.len()..]));
        }
    }

    #[tokio::test]
    async fn test_generate_writes_distinct_keys() {
        let memory = MemoryStorage::new();
        let report = generator(&memory).generate(5).await.unwrap();
        assert_eq!(
            report,
            MockReport {
                requested: 5,
                written: 5,
                failed: 0
            }
        );

        let keys = memory.keys("articles-data").await;
        assert_eq!(keys.len(), 5);
        for key in &keys {
            let article = Article::from_json(&memory.get("articles-data", key).await.unwrap()).unwrap();
            assert!(article.url.starts_with(MOCK_URL_BASE));
        }
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("great"), "Great");
        assert_eq!(capitalize(""), "");
    }
}
