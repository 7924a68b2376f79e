//! Deletion of images and folders across storage and the metadata store.
//!
//! Storage is always cleared before metadata. If the storage step fails the
//! row is kept so the image stays visible and the deletion can be retried.
//! If the metadata step fails after storage succeeded, the row points at a
//! missing object; that is reported as a repository error.

use tracing::{info, warn};

use super::folder::Folder;
use super::image::Image;
use super::repository::ContentRepository;
use crate::db::Database;
use crate::storage::{key_from_url, ObjectStorage};
use crate::{GalleryError, Result};

/// Result of deleting a folder.
#[derive(Debug, Clone)]
pub struct FolderDeletion {
    pub folder: Folder,
    /// Images removed from storage and the store before the folder row.
    pub images_removed: usize,
}

/// Coordinates deletions between storage and the metadata store.
pub struct DeletionCoordinator<'a> {
    db: &'a Database,
    storage: &'a dyn ObjectStorage,
}

impl<'a> DeletionCoordinator<'a> {
    pub fn new(db: &'a Database, storage: &'a dyn ObjectStorage) -> Self {
        Self { db, storage }
    }

    /// Delete one image: its storage object first, then its row.
    ///
    /// A URL with no recoverable key skips the storage step.
    pub async fn delete_image(&self, image: &Image) -> Result<()> {
        match key_from_url(&image.image_url) {
            Some(key) => {
                self.storage.remove(&key).await.map_err(|e| match e {
                    GalleryError::Storage(_) => e,
                    other => GalleryError::Storage(other.to_string()),
                })?;
            }
            None => {
                warn!(
                    image_id = image.id,
                    url = %image.image_url,
                    "image URL has no storage key, skipping storage removal"
                );
            }
        }

        let repo = ContentRepository::new(self.db);
        let deleted = repo.delete_image(image.id).await.map_err(|e| match e {
            GalleryError::Repository(_) => e,
            other => GalleryError::Repository(other.to_string()),
        })?;

        if !deleted {
            warn!(image_id = image.id, "image row was already gone");
        }
        info!(image_id = image.id, folder_id = image.folder_id, "image deleted");
        Ok(())
    }

    /// Delete a folder with everything in it.
    ///
    /// Each image goes through [`delete_image`](Self::delete_image) before the
    /// folder row is removed, so no storage object is left behind. The first
    /// failing image aborts the deletion; images already deleted stay deleted
    /// and the folder row is kept.
    pub async fn delete_folder(&self, folder_id: i64) -> Result<FolderDeletion> {
        let repo = ContentRepository::new(self.db);
        let folder = repo
            .get_folder(folder_id)
            .await?
            .ok_or_else(|| GalleryError::NotFound(format!("folder {folder_id}")))?;

        let images = repo.list_images(folder_id).await?;
        for (done, image) in images.iter().enumerate() {
            if let Err(e) = self.delete_image(image).await {
                warn!(
                    folder_id,
                    image_id = image.id,
                    removed = done,
                    error = %e,
                    "folder deletion stopped"
                );
                return Err(e);
            }
        }

        repo.delete_folder(folder_id).await?;
        info!(folder_id, images = images.len(), "folder deleted");

        Ok(FolderDeletion {
            folder,
            images_removed: images.len(),
        })
    }
}
