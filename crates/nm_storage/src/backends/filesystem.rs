use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nm_core::keys::{validate_container, validate_key};
use nm_core::{BlobStore, Error, Result};
use tokio::fs;
use uuid::Uuid;

/// Blobs as files: `<root>/<container>/<key>`.
#[derive(Debug, Clone)]
pub struct FilesystemStorage {
    root: PathBuf,
}

impl FilesystemStorage {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| Error::Storage(format!("Failed to create storage root {}: {}", root.display(), e)))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_dir(&self, container: &str) -> Result<PathBuf> {
        validate_container(container)?;
        Ok(self.root.join(container))
    }

    fn blob_path(&self, container: &str, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.container_dir(container)?.join(key))
    }
}

#[async_trait]
impl BlobStore for FilesystemStorage {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn ensure_container(&self, container: &str) -> Result<()> {
        let dir = self.container_dir(container)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::Storage(format!("Failed to create container {}: {}", dir.display(), e)))
    }

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.blob_path(container, key)?;
        let dir = self.container_dir(container)?;
        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return Err(Error::Storage(format!("container {} does not exist", container)));
        }

        // Write beside the target then rename, so readers never see half a blob.
        let tmp = dir.join(format!(".{}.{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp, &bytes)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(Error::Storage(format!("Failed to store {}: {}", path.display(), e)));
        }
        Ok(())
    }

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(container, key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::BlobNotFound {
                container: container.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(Error::Storage(format!("Failed to read {}: {}", path.display(), e))),
        }
    }

    async fn list(&self, container: &str) -> Result<Vec<String>> {
        let dir = self.container_dir(container)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Storage(format!("Failed to list {}: {}", dir.display(), e))),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::Storage(format!("Failed to list {}: {}", dir.display(), e)))?
        {
            // In-flight temp files start with a dot, which no key may.
            let name = entry.file_name().to_string_lossy().into_owned();
            if validate_key(&name).is_ok() {
                keys.push(name);
            }
        }
        keys.sort();
        Ok(keys)
    }
}
