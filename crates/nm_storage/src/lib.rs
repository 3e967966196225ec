use std::sync::Arc;
use std::time::Duration;

use nm_core::{BlobStore, Result};
use tracing::info;

pub mod backends;
pub mod connection;
pub mod events;

pub use backends::*;
pub use connection::{AzureCredential, ConnectionString};
pub use events::{BlobSubscription, EventedStore};

/// Opens the backend a connection string points at.
pub async fn create_storage(connection: &ConnectionString, storage_timeout: Duration) -> Result<Arc<dyn BlobStore>> {
    let storage: Arc<dyn BlobStore> = match connection {
        ConnectionString::Memory => Arc::new(MemoryStorage::new()),
        ConnectionString::Filesystem(root) => Arc::new(FilesystemStorage::new(root.clone()).await?),
        ConnectionString::Azure { endpoint, credential } => {
            Arc::new(AzureBlobStorage::new(endpoint.clone(), credential.clone(), storage_timeout)?)
        }
    };
    info!("🏦 Blob storage ready (using {})", storage.name());
    Ok(storage)
}

/// Parses `connection_string`, opens the backend and wraps it so writes can
/// be subscribed to.
pub async fn connect(connection_string: &str, storage_timeout: Duration) -> Result<Arc<EventedStore>> {
    let connection: ConnectionString = connection_string.parse()?;
    let storage = create_storage(&connection, storage_timeout).await?;
    Ok(Arc::new(EventedStore::new(storage)))
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{connect, create_storage, AzureCredential, BlobSubscription, ConnectionString, EventedStore};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory() {
        let store = connect("memory://", Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.name(), "memory");
        store.ensure_container("articles-data").await.unwrap();
        let mut events = store.subscribe("articles-data");
        store.put("articles-data", "a1", b"{}".to_vec()).await.unwrap();
        assert_eq!(events.recv().await.unwrap().key, "a1");
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_string() {
        assert!(connect("nonsense", Duration::from_secs(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_connect_azure_account_key() {
        let store = connect(
            "DefaultEndpointsProtocol=https;AccountName=news;AccountKey=c2VjcmV0;EndpointSuffix=core.windows.net",
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        assert_eq!(store.name(), "azure");
    }

    #[tokio::test]
    async fn test_connect_filesystem() {
        let dir = tempfile::TempDir::new().unwrap();
        let conn = format!("file://{}", dir.path().display());
        let store = connect(&conn, Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.name(), "filesystem");
    }
}
