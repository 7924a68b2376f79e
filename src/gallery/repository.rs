//! Content repository: folder and image access against the data store.
//!
//! There is no caching here; every listing re-reads the store. [`Catalog`]
//! keeps the last listing that loaded successfully for callers that need to
//! keep showing something when a reload fails.

use futures::future::join_all;
use tracing::{info, warn};

use super::folder::{Folder, FolderRepository, NewFolder};
use super::image::{Image, ImageRepository, NewImage};
use crate::db::Database;
use crate::{GalleryError, Result};

/// A folder together with its images, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryFolder {
    pub folder: Folder,
    pub images: Vec<Image>,
}

impl GalleryFolder {
    pub fn id(&self) -> i64 {
        self.folder.id
    }

    pub fn name(&self) -> &str {
        &self.folder.name
    }

    /// Number of images shown for this folder.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Image used as the folder's cover (the newest one).
    pub fn cover(&self) -> Option<&Image> {
        self.images.first()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Read/write access to folders and images.
pub struct ContentRepository<'a> {
    db: &'a Database,
}

impl<'a> ContentRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// List every folder (newest first) with its images (newest first).
    ///
    /// Image listings run concurrently. A folder whose image listing fails is
    /// returned with no images; only a failing folder listing fails the call.
    pub async fn list_folders(&self) -> Result<Vec<GalleryFolder>> {
        let folders = FolderRepository::new(self.db.pool()).list().await?;

        let loaded = join_all(folders.into_iter().map(|folder| async move {
            let images = match self.list_images(folder.id).await {
                Ok(images) => images,
                Err(e) => {
                    warn!(folder_id = folder.id, error = %e, "failed to load folder images");
                    Vec::new()
                }
            };
            GalleryFolder { folder, images }
        }))
        .await;

        Ok(loaded)
    }

    /// List the images of one folder, newest first.
    pub async fn list_images(&self, folder_id: i64) -> Result<Vec<Image>> {
        ImageRepository::new(self.db.pool())
            .list_by_folder(folder_id)
            .await
    }

    /// Get a folder row by ID.
    pub async fn get_folder(&self, folder_id: i64) -> Result<Option<Folder>> {
        FolderRepository::new(self.db.pool())
            .get_by_id(folder_id)
            .await
    }

    /// Get an image row by ID.
    pub async fn get_image(&self, image_id: i64) -> Result<Option<Image>> {
        ImageRepository::new(self.db.pool()).get_by_id(image_id).await
    }

    /// Create a folder. Name and description are trimmed; a blank name is rejected.
    pub async fn create_folder(&self, name: &str, description: &str) -> Result<GalleryFolder> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GalleryError::Validation(
                "folder name must not be empty".to_string(),
            ));
        }

        let new_folder = NewFolder::new(name).with_description(description.trim());
        let folder = FolderRepository::new(self.db.pool())
            .create(&new_folder)
            .await?;

        info!(folder_id = folder.id, name = %folder.name, "folder created");
        Ok(GalleryFolder {
            folder,
            images: Vec::new(),
        })
    }

    /// Delete a folder row (image rows cascade). Storage objects are untouched;
    /// use the deletion coordinator to remove those first.
    pub async fn delete_folder(&self, folder_id: i64) -> Result<bool> {
        FolderRepository::new(self.db.pool()).delete(folder_id).await
    }

    /// Delete an image row. The storage object is untouched.
    pub async fn delete_image(&self, image_id: i64) -> Result<bool> {
        ImageRepository::new(self.db.pool()).delete(image_id).await
    }

    /// Insert an image row.
    pub async fn insert_image(&self, folder_id: i64, title: &str, url: &str) -> Result<Image> {
        ImageRepository::new(self.db.pool())
            .create(&NewImage::new(folder_id, title, url))
            .await
    }
}

/// Last successfully loaded gallery listing.
#[derive(Debug, Default)]
pub struct Catalog {
    folders: Vec<GalleryFolder>,
    loaded: bool,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload from the store. On failure the previous listing is kept.
    pub async fn refresh(&mut self, repo: &ContentRepository<'_>) -> Result<&[GalleryFolder]> {
        match repo.list_folders().await {
            Ok(folders) => {
                self.folders = folders;
                self.loaded = true;
                Ok(&self.folders)
            }
            Err(e) => {
                warn!(error = %e, "gallery reload failed, keeping previous listing");
                Err(e)
            }
        }
    }

    pub fn folders(&self) -> &[GalleryFolder] {
        &self.folders
    }

    /// Whether at least one refresh has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn find(&self, folder_id: i64) -> Option<&GalleryFolder> {
        self.folders.iter().find(|f| f.id() == folder_id)
    }
}
