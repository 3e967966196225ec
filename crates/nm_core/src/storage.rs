use async_trait::async_trait;

use crate::Result;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the backend name, for logs
    fn name(&self) -> &str;

    /// Creates the container if it does not exist yet
    async fn ensure_container(&self, container: &str) -> Result<()>;

    /// Writes a blob, replacing any existing blob under the same key
    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Reads a blob; a missing blob is `Error::BlobNotFound`
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>>;

    /// Lists the keys in a container, sorted. A missing container lists empty
    async fn list(&self, container: &str) -> Result<Vec<String>>;
}

/// Notification that a blob was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEvent {
    pub container: String,
    pub key: String,
    pub bytes: Vec<u8>,
}
