//! Image metadata types and repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{GalleryError, Result};

/// Metadata row for an uploaded image. Always owned by one folder.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Image {
    /// Unique image ID.
    pub id: i64,
    /// Folder this image belongs to.
    pub folder_id: i64,
    /// Display title, the source filename without its extension.
    pub title: String,
    /// Public URL of the storage object.
    pub image_url: String,
    /// When the image was stored.
    pub created_at: DateTime<Utc>,
}

/// Data for inserting an image row.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub folder_id: i64,
    pub title: String,
    pub image_url: String,
}

impl NewImage {
    pub fn new(folder_id: i64, title: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            folder_id,
            title: title.into(),
            image_url: image_url.into(),
        }
    }
}

/// Repository for rows of the `images` table.
pub struct ImageRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ImageRepository<'a> {
    /// Create a new ImageRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an image row and return it.
    pub async fn create(&self, image: &NewImage) -> Result<Image> {
        let result =
            sqlx::query("INSERT INTO images (folder_id, title, image_url) VALUES (?, ?, ?)")
                .bind(image.folder_id)
                .bind(&image.title)
                .bind(&image.image_url)
                .execute(self.pool)
                .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| GalleryError::NotFound("image".to_string()))
    }

    /// Get an image by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Image>> {
        let image = sqlx::query_as::<_, Image>(
            "SELECT id, folder_id, title, image_url, created_at FROM images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(image)
    }

    /// List the images of one folder, newest first.
    pub async fn list_by_folder(&self, folder_id: i64) -> Result<Vec<Image>> {
        let images = sqlx::query_as::<_, Image>(
            "SELECT id, folder_id, title, image_url, created_at FROM images
             WHERE folder_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(folder_id)
        .fetch_all(self.pool)
        .await?;

        Ok(images)
    }

    /// Delete an image row by ID.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
