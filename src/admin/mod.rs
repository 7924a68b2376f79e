//! Administration surface for the gallery.
//!
//! [`GalleryAdmin`] bundles folder creation, uploads and deletions behind a
//! signed-in [`AdminSession`]. After every mutation the catalog is reloaded
//! from the store, so the listing never reflects optimistic local edits.
//!
//! Returned errors are reserved for caller problems: a missing session
//! (`Auth`) or bad input (`Validation`). Store and storage failures are
//! turned into an [`OperatorMessage`] of kind [`MessageKind::Error`].

use tracing::{info, warn};

use crate::auth::AdminSession;
use crate::config::IngestConfig;
use crate::db::Database;
use crate::gallery::{
    BatchResult, Catalog, ContentRepository, DeletionCoordinator, GalleryFolder, IngestPipeline,
    SourceFile,
};
use crate::storage::ObjectStorage;
use crate::{GalleryError, Result};

/// Kind of operator feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// Feedback shown to the operator after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl OperatorMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == MessageKind::Success
    }

    /// Message for a finished upload batch. Partial success counts as an error.
    pub fn for_batch(result: &BatchResult) -> Self {
        if result.is_complete_success() {
            Self::success(result.summary())
        } else {
            Self::error(result.summary())
        }
    }

    /// Message for a failed deletion, naming the step that failed.
    pub fn for_deletion_failure(error: &GalleryError) -> Self {
        match error {
            GalleryError::Storage(detail) => Self::error(format!("Failed to delete file: {detail}")),
            GalleryError::Repository(detail) => {
                Self::error(format!("Failed to delete from database: {detail}"))
            }
            other => Self::error(format!("Error: {other}")),
        }
    }
}

/// Gallery administration for a signed-in operator.
pub struct GalleryAdmin<'a> {
    db: &'a Database,
    storage: &'a dyn ObjectStorage,
    ingest: IngestConfig,
    catalog: Catalog,
}

impl<'a> GalleryAdmin<'a> {
    pub fn new(db: &'a Database, storage: &'a dyn ObjectStorage) -> Self {
        Self {
            db,
            storage,
            ingest: IngestConfig::default(),
            catalog: Catalog::new(),
        }
    }

    /// Use `config` for compression bounds and upload concurrency.
    pub fn with_ingest_config(mut self, config: IngestConfig) -> Self {
        self.ingest = config;
        self
    }

    /// Folders as of the last successful reload.
    pub fn folders(&self) -> &[GalleryFolder] {
        self.catalog.folders()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Reload the catalog from the store.
    ///
    /// On failure the previous listing stays and an error message is returned.
    pub async fn reload(&mut self) -> Option<OperatorMessage> {
        let repo = ContentRepository::new(self.db);
        match self.catalog.refresh(&repo).await {
            Ok(_) => None,
            Err(e) => Some(OperatorMessage::error(format!("Failed to load gallery: {e}"))),
        }
    }

    /// Create a folder.
    pub async fn create_folder(
        &mut self,
        session: &AdminSession,
        name: &str,
        description: &str,
    ) -> Result<OperatorMessage> {
        session.require_user()?;

        let repo = ContentRepository::new(self.db);
        let message = match repo.create_folder(name, description).await {
            Ok(folder) => OperatorMessage::success(format!("Folder \"{}\" created.", folder.name())),
            Err(e @ GalleryError::Validation(_)) => return Err(e),
            Err(e) => OperatorMessage::error(format!("Failed to create folder: {e}")),
        };

        self.reload().await;
        Ok(message)
    }

    /// Upload `files` into the selected folder.
    pub async fn upload(
        &mut self,
        session: &AdminSession,
        folder_id: Option<i64>,
        files: Vec<SourceFile>,
    ) -> Result<OperatorMessage> {
        let user = session.require_user()?;
        let folder_id = folder_id
            .ok_or_else(|| GalleryError::Validation("no folder selected".to_string()))?;

        info!(operator = %user.email, folder_id, files = files.len(), "upload requested");
        let result = IngestPipeline::new(self.db, self.storage)
            .with_config(&self.ingest)
            .ingest(folder_id, files)
            .await;

        let message = match result {
            Ok(batch) => OperatorMessage::for_batch(&batch),
            Err(e @ GalleryError::Validation(_)) => return Err(e),
            Err(e) => OperatorMessage::error(format!("Error: {e}")),
        };

        self.reload().await;
        Ok(message)
    }

    /// Delete one image, storage object first.
    pub async fn delete_image(
        &mut self,
        session: &AdminSession,
        image_id: i64,
    ) -> Result<OperatorMessage> {
        session.require_user()?;

        let repo = ContentRepository::new(self.db);
        let image = match repo.get_image(image_id).await {
            Ok(Some(image)) => image,
            Ok(None) => return Ok(OperatorMessage::error("Image not found.")),
            Err(e) => return Ok(OperatorMessage::error(format!("Error: {e}"))),
        };

        let message = match DeletionCoordinator::new(self.db, self.storage)
            .delete_image(&image)
            .await
        {
            Ok(()) => OperatorMessage::success("Image deleted."),
            Err(e) => {
                warn!(image_id, error = %e, "image deletion failed");
                OperatorMessage::for_deletion_failure(&e)
            }
        };

        self.reload().await;
        Ok(message)
    }

    /// Delete a folder and all of its images.
    pub async fn delete_folder(
        &mut self,
        session: &AdminSession,
        folder_id: i64,
    ) -> Result<OperatorMessage> {
        session.require_user()?;

        let message = match DeletionCoordinator::new(self.db, self.storage)
            .delete_folder(folder_id)
            .await
        {
            Ok(deletion) => OperatorMessage::success(format!(
                "Folder \"{}\" deleted ({} images removed).",
                deletion.folder.name, deletion.images_removed
            )),
            Err(GalleryError::NotFound(_)) => OperatorMessage::error("Folder not found."),
            Err(e) => {
                warn!(folder_id, error = %e, "folder deletion failed");
                OperatorMessage::for_deletion_failure(&e)
            }
        };

        self.reload().await;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::{AuthError, StaticAuthenticator};
    use crate::test_helpers::{block_image_writes, password_hash, solid_png, FaultyStorage};
    use tempfile::TempDir;

    const EMAIL: &str = "admin@ponkesdes.id";
    const PASSWORD: &str = "rahasia123";

    fn authenticator() -> Arc<StaticAuthenticator> {
        Arc::new(StaticAuthenticator::new(EMAIL, password_hash(PASSWORD)).unwrap())
    }

    async fn signed_in() -> AdminSession {
        let mut session = AdminSession::new(authenticator());
        session.login(EMAIL, PASSWORD).await.unwrap();
        session
    }

    fn signed_out() -> AdminSession {
        AdminSession::new(authenticator())
    }

    fn files(count: usize) -> Vec<SourceFile> {
        (0..count)
            .map(|i| SourceFile::new(format!("kegiatan{i}.png"), solid_png(24, 24)))
            .collect()
    }

    #[tokio::test]
    async fn test_requires_session() {
        let db = Database::open_in_memory().await.unwrap();
        let temp_dir = TempDir::new().unwrap();
        let storage = FaultyStorage::new(temp_dir.path());
        let mut admin = GalleryAdmin::new(&db, &storage);
        let session = signed_out();

        let result = admin.create_folder(&session, "Posyandu", "").await;
        assert!(matches!(
            result,
            Err(GalleryError::Auth(AuthError::NotAuthenticated))
        ));
        let result = admin.delete_folder(&session, 1).await;
        assert!(matches!(result, Err(GalleryError::Auth(_))));
        assert!(ContentRepository::new(&db).list_folders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_folder_reloads_catalog() {
        let db = Database::open_in_memory().await.unwrap();
        let temp_dir = TempDir::new().unwrap();
        let storage = FaultyStorage::new(temp_dir.path());
        let mut admin = GalleryAdmin::new(&db, &storage);
        let session = signed_in().await;

        let message = admin.create_folder(&session, "  Posyandu ", "").await.unwrap();

        assert!(message.is_success());
        assert_eq!(admin.folders().len(), 1);
        assert_eq!(admin.folders()[0].name(), "Posyandu");
    }

    #[tokio::test]
    async fn test_create_folder_blank_name() {
        let db = Database::open_in_memory().await.unwrap();
        let temp_dir = TempDir::new().unwrap();
        let storage = FaultyStorage::new(temp_dir.path());
        let mut admin = GalleryAdmin::new(&db, &storage);
        let session = signed_in().await;

        let result = admin.create_folder(&session, "   ", "").await;
        assert!(matches!(result, Err(GalleryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_upload_without_folder() {
        let db = Database::open_in_memory().await.unwrap();
        let temp_dir = TempDir::new().unwrap();
        let storage = FaultyStorage::new(temp_dir.path());
        let mut admin = GalleryAdmin::new(&db, &storage);
        let session = signed_in().await;

        let result = admin.upload(&session, None, files(1)).await;
        assert!(matches!(result, Err(GalleryError::Validation(msg)) if msg == "no folder selected"));
        assert_eq!(storage.inner().object_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upload_messages() {
        let db = Database::open_in_memory().await.unwrap();
        let temp_dir = TempDir::new().unwrap();
        let storage = FaultyStorage::new(temp_dir.path());
        let mut admin = GalleryAdmin::new(&db, &storage);
        let session = signed_in().await;
        admin.create_folder(&session, "Lomba", "").await.unwrap();
        let folder_id = admin.folders()[0].id();

        let message = admin.upload(&session, Some(folder_id), files(2)).await.unwrap();
        assert_eq!(message, OperatorMessage::success("Uploaded 2 image(s)."));
        assert_eq!(admin.folders()[0].image_count(), 2);

        storage.fail_uploads_matching("_0_");
        let message = admin.upload(&session, Some(folder_id), files(3)).await.unwrap();
        assert_eq!(message, OperatorMessage::error("Uploaded 2 image(s), 1 failed."));
        assert_eq!(admin.folders()[0].image_count(), 4);
    }

    #[tokio::test]
    async fn test_delete_image_reports_failing_step() {
        let db = Database::open_in_memory().await.unwrap();
        let temp_dir = TempDir::new().unwrap();
        let storage = FaultyStorage::new(temp_dir.path());
        let mut admin = GalleryAdmin::new(&db, &storage);
        let session = signed_in().await;
        admin.create_folder(&session, "Senam", "").await.unwrap();
        let folder_id = admin.folders()[0].id();
        admin.upload(&session, Some(folder_id), files(2)).await.unwrap();
        let (failing, other): (Vec<_>, Vec<_>) = admin.folders()[0]
            .images
            .iter()
            .partition(|i| i.image_url.contains("_1_"));
        let (failing, other) = (failing[0].id, other[0].id);

        storage.fail_removes_matching("_1_");
        let message = admin.delete_image(&session, failing).await.unwrap();
        assert_eq!(message.kind, MessageKind::Error);
        assert!(message.text.starts_with("Failed to delete file:"));
        assert_eq!(admin.folders()[0].image_count(), 2);

        block_image_writes(&db, "DELETE").await;
        let message = admin.delete_image(&session, other).await.unwrap();
        assert!(message.text.starts_with("Failed to delete from database:"));
    }

    #[tokio::test]
    async fn test_delete_folder_message() {
        let db = Database::open_in_memory().await.unwrap();
        let temp_dir = TempDir::new().unwrap();
        let storage = FaultyStorage::new(temp_dir.path());
        let mut admin = GalleryAdmin::new(&db, &storage);
        let session = signed_in().await;
        admin.create_folder(&session, "Arsip", "").await.unwrap();
        let folder_id = admin.folders()[0].id();
        admin.upload(&session, Some(folder_id), files(2)).await.unwrap();

        let message = admin.delete_folder(&session, folder_id).await.unwrap();

        assert_eq!(
            message,
            OperatorMessage::success("Folder \"Arsip\" deleted (2 images removed).")
        );
        assert!(admin.folders().is_empty());
        assert_eq!(storage.inner().object_count().unwrap(), 0);

        let message = admin.delete_folder(&session, folder_id).await.unwrap();
        assert_eq!(message, OperatorMessage::error("Folder not found."));
    }

    #[test]
    fn test_deletion_failure_messages() {
        let storage = OperatorMessage::for_deletion_failure(&GalleryError::Storage("x".into()));
        let repo = OperatorMessage::for_deletion_failure(&GalleryError::Repository("y".into()));

        assert_eq!(storage.text, "Failed to delete file: x");
        assert_eq!(repo.text, "Failed to delete from database: y");
        assert_ne!(storage.text, repo.text);
    }
}
