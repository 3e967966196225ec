use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use nm_core::{
    with_deadline, AnnotatedArticle, Article, BlobEvent, BlobStore, Config, Containers, Error, Result, Sentiment,
    SentimentScorer,
};
use nm_storage::BlobSubscription;
use tracing::{error, info, warn};

/// Progress of a single annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Parsed,
    Scored,
    Persisted,
    Failed,
}

/// Outcome of a backfill sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Raw keys that had no annotated counterpart.
    pub pending: usize,
    pub annotated: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct Annotation {
    pub key: String,
    pub article: AnnotatedArticle,
    /// Exactly what was written to the sentiment container.
    pub bytes: Vec<u8>,
}

/// Turns raw articles into annotated ones, one blob event at a time.
pub struct Annotator {
    store: Arc<dyn BlobStore>,
    scorer: Arc<dyn SentimentScorer>,
    containers: Containers,
    invocation_timeout: Duration,
}

impl fmt::Debug for Annotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotator")
            .field("store", &self.store.name())
            .field("scorer", &self.scorer.name())
            .field("containers", &self.containers)
            .finish()
    }
}

impl Annotator {
    pub fn new(config: &Config, store: Arc<dyn BlobStore>, scorer: Arc<dyn SentimentScorer>) -> Self {
        Self {
            store,
            scorer,
            containers: config.containers.clone(),
            invocation_timeout: config.invocation_timeout,
        }
    }

    /// Scores `content` off the async runtime. Blank content is neutral.
    pub async fn score(&self, content: &str) -> Result<Sentiment> {
        if content.trim().is_empty() {
            return Ok(Sentiment::NEUTRAL);
        }
        let scorer = self.scorer.clone();
        let content = content.to_string();
        tokio::task::spawn_blocking(move || scorer.score(&content))
            .await
            .map_err(|e| Error::Scoring(format!("scorer task failed: {}", e)))?
    }

    async fn process(&self, event: &BlobEvent, stage: &mut Stage) -> Result<Annotation> {
        let article = Article::from_json(&event.bytes)?;
        *stage = Stage::Parsed;

        let sentiment = self.score(&article.content).await?;
        *stage = Stage::Scored;

        let annotated = AnnotatedArticle::new(article, sentiment);
        let bytes = annotated.to_json()?;
        self.store
            .put(&self.containers.sentiment, &event.key, bytes.clone())
            .await?;
        *stage = Stage::Persisted;

        Ok(Annotation {
            key: event.key.clone(),
            article: annotated,
            bytes,
        })
    }

    /// Handles one raw-article event: parse, score, write under the same key.
    pub async fn handle(&self, event: BlobEvent) -> Result<Annotation> {
        let started = Instant::now();
        let mut stage = Stage::Received;
        info!(key = %event.key, bytes = event.bytes.len(), "📥 Annotating blob");

        let result = with_deadline(self.invocation_timeout, "annotate", self.process(&event, &mut stage)).await;
        match &result {
            Ok(annotation) => {
                let sentiment = annotation.article.sentiment();
                info!(
                    key = %event.key,
                    polarity = sentiment.polarity,
                    subjectivity = sentiment.subjectivity,
                    overall = sentiment.overall(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "✅ Annotated article stored in {}",
                    self.containers.sentiment
                );
            }
            Err(e) => {
                let failed_after = stage;
                stage = Stage::Failed;
                error!(
                    key = %event.key,
                    ?stage,
                    ?failed_after,
                    kind = e.kind(),
                    error = %e,
                    "❌ Annotation failed"
                );
            }
        }
        result
    }

    /// Re-processes a raw article that is already stored.
    pub async fn annotate_key(&self, key: &str) -> Result<Annotation> {
        self.store.ensure_container(&self.containers.sentiment).await?;
        let bytes = self.store.get(&self.containers.raw, key).await?;
        self.handle(BlobEvent {
            container: self.containers.raw.clone(),
            key: key.to_string(),
            bytes,
        })
        .await
    }

    /// Annotates every raw article that has no annotated counterpart yet.
    /// Covers writes made while no subscriber was listening and annotations
    /// that failed earlier. One failure does not stop the sweep.
    pub async fn backfill(&self) -> Result<BackfillReport> {
        self.store.ensure_container(&self.containers.sentiment).await?;
        let raw = self.store.list(&self.containers.raw).await?;
        let done: HashSet<String> = self.store.list(&self.containers.sentiment).await?.into_iter().collect();

        let pending: Vec<String> = raw.into_iter().filter(|key| !done.contains(key)).collect();
        let mut report = BackfillReport {
            pending: pending.len(),
            ..BackfillReport::default()
        };
        if pending.is_empty() {
            info!(container = %self.containers.raw, "Nothing to backfill");
            return Ok(report);
        }

        info!(pending = pending.len(), "🧹 Backfilling unannotated articles");
        for key in pending {
            let result = match self.store.get(&self.containers.raw, &key).await {
                Ok(bytes) => self
                    .handle(BlobEvent {
                        container: self.containers.raw.clone(),
                        key: key.clone(),
                        bytes,
                    })
                    .await
                    .map(|_| ()),
                Err(e) => {
                    warn!(%key, kind = e.kind(), error = %e, "Failed to read raw article");
                    Err(e)
                }
            };
            match result {
                Ok(()) => report.annotated += 1,
                Err(_) => report.failed += 1,
            }
        }

        info!(
            pending = report.pending,
            annotated = report.annotated,
            failed = report.failed,
            "Backfill finished"
        );
        Ok(report)
    }

    /// Handles every event of `subscription` until the store goes away.
    /// Each event runs in its own task; failures are logged and do not stop
    /// the loop.
    pub async fn run(self: Arc<Self>, mut subscription: BlobSubscription) -> Result<()> {
        if subscription.container() != self.containers.raw {
            warn!(
                subscribed = subscription.container(),
                expected = %self.containers.raw,
                "Annotator subscribed to an unexpected container"
            );
        }
        self.store.ensure_container(&self.containers.sentiment).await?;
        info!(container = subscription.container(), "👂 Annotator listening for new articles");

        while let Some(event) = subscription.recv().await {
            let annotator = self.clone();
            tokio::spawn(async move {
                // Outcome is logged by `handle`.
                let _ = annotator.handle(event).await;
            });
        }

        info!("Annotator subscription closed");
        Ok(())
    }
}
