use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nm_core::{BlobEvent, BlobStore, Result};
use tokio::sync::mpsc;
use tracing::debug;

struct Subscriber {
    container: String,
    tx: mpsc::UnboundedSender<BlobEvent>,
}

/// Receiving end of a container subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct BlobSubscription {
    container: String,
    rx: mpsc::UnboundedReceiver<BlobEvent>,
}

impl BlobSubscription {
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Waits for the next write to the container. `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<BlobEvent> {
        self.rx.recv().await
    }
}

/// Wraps a backend and announces every successful `put` to the subscribers
/// of that container. Events are only delivered to subscriptions that
/// exist at the time of the write.
pub struct EventedStore {
    inner: Arc<dyn BlobStore>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl EventedStore {
    pub fn new(inner: Arc<dyn BlobStore>) -> Self {
        Self {
            inner,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, container: &str) -> BlobSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Subscriber {
                container: container.to_string(),
                tx,
            });
        debug!(container, "📬 New blob subscription");
        BlobSubscription {
            container: container.to_string(),
            rx,
        }
    }

    fn publish(&self, event: BlobEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|s| !s.tx.is_closed());
        for subscriber in subscribers.iter().filter(|s| s.container == event.container) {
            // A receiver dropped since the retain above is pruned next time.
            let _ = subscriber.tx.send(event.clone());
        }
    }
}

#[async_trait]
impl BlobStore for EventedStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn ensure_container(&self, container: &str) -> Result<()> {
        self.inner.ensure_container(container).await
    }

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.inner.put(container, key, bytes.clone()).await?;
        self.publish(BlobEvent {
            container: container.to_string(),
            key: key.to_string(),
            bytes,
        });
        Ok(())
    }

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>> {
        self.inner.get(container, key).await
    }

    async fn list(&self, container: &str) -> Result<Vec<String>> {
        self.inner.list(container).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryStorage;

    fn store() -> EventedStore {
        EventedStore::new(Arc::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_put_notifies_matching_subscribers() {
        let store = store();
        store.ensure_container("articles-data").await.unwrap();
        store.ensure_container("articles-sentiment").await.unwrap();
        let mut raw = store.subscribe("articles-data");
        let mut sentiment = store.subscribe("articles-sentiment");

        store.put("articles-data", "a1", b"{}".to_vec()).await.unwrap();

        let event = raw.recv().await.unwrap();
        assert_eq!(event.container, "articles-data");
        assert_eq!(event.key, "a1");
        assert_eq!(event.bytes, b"{}");
        assert!(sentiment.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_put_is_not_announced() {
        let store = store();
        let mut raw = store.subscribe("articles-data");
        // Container was never created.
        assert!(store.put("articles-data", "a1", b"{}".to_vec()).await.is_err());
        assert!(raw.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropped_subscribers_are_pruned() {
        let store = store();
        store.ensure_container("articles-data").await.unwrap();
        drop(store.subscribe("articles-data"));
        let mut live = store.subscribe("articles-data");

        store.put("articles-data", "a1", b"1".to_vec()).await.unwrap();
        assert_eq!(store.subscribers.lock().unwrap().len(), 1);
        assert_eq!(live.recv().await.unwrap().key, "a1");
    }

    #[tokio::test]
    async fn test_every_write_is_delivered() {
        let store = store();
        store.ensure_container("articles-data").await.unwrap();
        let mut raw = store.subscribe("articles-data");
        for i in 0..3 {
            store.put("articles-data", &format!("k{}", i), vec![i]).await.unwrap();
        }
        // Overwrites are announced too.
        store.put("articles-data", "k0", vec![9]).await.unwrap();

        let mut keys = Vec::new();
        for _ in 0..4 {
            keys.push(raw.recv().await.unwrap().key);
        }
        assert_eq!(keys, ["k0", "k1", "k2", "k0"]);
    }
}
