use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use nm_core::keys::{validate_container, validate_key};
use nm_core::{BlobStore, Error, Result};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    containers: HashMap<String, BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_container(&mut self, container: &str) {
        self.containers.entry(container.to_string()).or_default();
    }

    pub fn put(&mut self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        let blobs = self
            .containers
            .get_mut(container)
            .ok_or_else(|| Error::Storage(format!("container {} does not exist", container)))?;
        blobs.insert(key.to_string(), bytes);
        Ok(())
    }

    pub fn get(&self, container: &str, key: &str) -> Result<Vec<u8>> {
        self.containers
            .get(container)
            .and_then(|blobs| blobs.get(key))
            .cloned()
            .ok_or_else(|| Error::BlobNotFound {
                container: container.to_string(),
                key: key.to_string(),
            })
    }

    pub fn keys(&self, container: &str) -> Vec<String> {
        self.containers
            .get(container)
            .map(|blobs| blobs.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// In-process blob store. Clones share the same blobs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys in `container`, sorted.
    pub async fn keys(&self, container: &str) -> Vec<String> {
        self.store.read().await.keys(container)
    }
}

#[async_trait]
impl BlobStore for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn ensure_container(&self, container: &str) -> Result<()> {
        validate_container(container)?;
        self.store.write().await.ensure_container(container);
        Ok(())
    }

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        validate_key(key)?;
        self.store.write().await.put(container, key, bytes)
    }

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>> {
        validate_key(key)?;
        self.store.read().await.get(container, key)
    }

    async fn list(&self, container: &str) -> Result<Vec<String>> {
        validate_container(container)?;
        Ok(self.store.read().await.keys(container))
    }
}
