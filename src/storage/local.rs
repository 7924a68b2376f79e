//! Directory-backed object storage.
//!
//! Objects are stored flat, one file per key:
//! ```text
//! {base_path}/
//! ├── img_1718000000000_0_posyandu.jpg
//! ├── img_1718000000000_1_senam.jpg
//! └── ...
//! ```
//! and served under `{public_base_url}/{percent-encoded key}`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{key_from_url, ObjectStorage};
use crate::{GalleryError, Result};

/// Object storage on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    /// Create a LocalStorage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: &str) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Check if an object exists.
    pub fn exists(&self, key: &str) -> bool {
        Self::validate_key(key).is_ok() && self.object_path(key).exists()
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> Result<usize> {
        let count = std::fs::read_dir(&self.base_path)?
            .flatten()
            .filter(|entry| entry.path().is_file())
            .count();
        Ok(count)
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    /// Keys are single path components.
    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty()
            || key == "."
            || key == ".."
            || key.contains('/')
            || key.contains('\\')
            || key.contains('\0')
        {
            return Err(GalleryError::Storage(format!("invalid object key: {key:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        Self::validate_key(key)?;
        let path = self.object_path(key);

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(GalleryError::Storage(format!(
                    "object already exists: {key}"
                )));
            }
            Err(e) => return Err(GalleryError::Storage(format!("upload of {key} failed: {e}"))),
        };

        file.write_all(bytes)
            .await
            .map_err(|e| GalleryError::Storage(format!("upload of {key} failed: {e}")))?;
        file.flush()
            .await
            .map_err(|e| GalleryError::Storage(format!("upload of {key} failed: {e}")))?;

        debug!(key, content_type, size = bytes.len(), "stored object");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, urlencoding::encode(key))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        Self::validate_key(key)?;

        match fs::remove_file(self.object_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(key, "object to remove was already gone");
                Ok(())
            }
            Err(e) => Err(GalleryError::Storage(format!("remove of {key} failed: {e}"))),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if !url.starts_with(&format!("{}/", self.public_base_url)) {
            return Err(GalleryError::Storage(format!(
                "URL is not served by this storage: {url}"
            )));
        }

        let key = key_from_url(url)
            .ok_or_else(|| GalleryError::Storage(format!("URL has no object key: {url}")))?;
        Self::validate_key(&key)?;

        fs::read(self.object_path(&key)).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                GalleryError::Storage(format!("object not found: {key}"))
            } else {
                GalleryError::Storage(format!("fetch of {key} failed: {e}"))
            }
        })
    }
}
