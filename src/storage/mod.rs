//! Object storage for gallery images.
//!
//! The gallery only needs four things from a storage service: put bytes
//! under a key, turn a key into a public URL, remove a key, and read an
//! object back by its public URL (for the viewer's download action).
//! [`ObjectStorage`] is that seam; [`LocalStorage`] keeps objects in a
//! directory and [`SupabaseStorage`] talks to a Supabase bucket.

mod local;
mod supabase;

pub use local::LocalStorage;
pub use supabase::SupabaseStorage;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StorageBackend, StorageConfig};
use crate::Result;

/// A storage service holding image objects under flat string keys.
///
/// Every failure is reported as [`GalleryError::Storage`](crate::GalleryError::Storage).
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Store `bytes` under `key`. Fails if the key is already taken.
    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;

    /// Public URL under which `key` is served.
    fn public_url(&self, key: &str) -> String;

    /// Remove the object stored under `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Read an object back through its public URL.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Build the storage backend selected in the configuration.
pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>> {
    match config.backend {
        StorageBackend::Local => Ok(Arc::new(LocalStorage::new(
            &config.path,
            &config.public_base_url,
        )?)),
        StorageBackend::Supabase => Ok(Arc::new(SupabaseStorage::new(
            &config.supabase_url,
            &config.bucket,
            &config.api_key,
        )?)),
    }
}

/// Recover the storage key from a public URL: its last path segment, percent-decoded.
///
/// Strings that don't parse as URLs are split on `/` instead.
pub fn key_from_url(image_url: &str) -> Option<String> {
    let segment = match url::Url::parse(image_url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Err(_) => image_url.rsplit('/').next().map(str::to_string),
    }?;

    if segment.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(&segment)
        .map(|s| s.into_owned())
        .unwrap_or(segment);
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_url() {
        assert_eq!(
            key_from_url("https://x.supabase.co/storage/v1/object/public/gallery-images/img_1_0_a.jpg"),
            Some("img_1_0_a.jpg".to_string())
        );
    }

    #[test]
    fn test_key_from_url_decodes_percent_escapes() {
        assert_eq!(
            key_from_url("http://localhost:8080/gallery-images/img_1_0_foto%20kegiatan.jpg"),
            Some("img_1_0_foto kegiatan.jpg".to_string())
        );
    }

    #[test]
    fn test_key_from_url_ignores_query() {
        assert_eq!(
            key_from_url("http://cdn.example/bucket/img_2_1_b.jpg?download=1"),
            Some("img_2_1_b.jpg".to_string())
        );
    }

    #[test]
    fn test_key_from_url_plain_path() {
        assert_eq!(key_from_url("bucket/img_3.jpg"), Some("img_3.jpg".to_string()));
        assert_eq!(key_from_url("img_3.jpg"), Some("img_3.jpg".to_string()));
    }

    #[test]
    fn test_key_from_url_trailing_slash() {
        assert_eq!(key_from_url("http://cdn.example/bucket/"), None);
        assert_eq!(key_from_url(""), None);
    }

    #[test]
    fn test_from_config_local() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = StorageConfig {
            path: temp_dir.path().join("objects").display().to_string(),
            ..StorageConfig::default()
        };

        let storage = from_config(&config).unwrap();
        assert_eq!(storage.backend_name(), "local");
    }

    #[test]
    fn test_from_config_supabase() {
        let config = StorageConfig {
            backend: StorageBackend::Supabase,
            supabase_url: "https://example.supabase.co".to_string(),
            api_key: "key".to_string(),
            ..StorageConfig::default()
        };

        let storage = from_config(&config).unwrap();
        assert_eq!(storage.backend_name(), "supabase");
    }
}
