//! Ingestion pipeline: turns a batch of source files into stored images.
//!
//! Each file runs compress → name → upload → resolve URL → persist. A
//! failing step marks only that file as failed; the batch carries on. An
//! object whose metadata insert fails stays in storage.

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::compress::{compress, CompressOptions, CompressedImage};
use super::image::Image;
use super::naming::{batch_timestamp_ms, storage_key, title_from_filename};
use super::repository::ContentRepository;
use crate::config::IngestConfig;
use crate::db::Database;
use crate::storage::ObjectStorage;
use crate::{GalleryError, Result};

/// One operator-selected file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Filename as picked by the operator.
    pub filename: String,
    /// Raw file content.
    pub content: Vec<u8>,
}

impl SourceFile {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }
}

/// Result of ingesting one file.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Succeeded(Image),
    Failed { filename: String, reason: String },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Succeeded(_))
    }
}

/// Aggregate result of one ingestion call.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub success_count: usize,
    pub error_count: usize,
    /// Per-file outcomes in input order.
    pub outcomes: Vec<UploadOutcome>,
}

impl BatchResult {
    fn from_outcomes(outcomes: Vec<UploadOutcome>) -> Self {
        let success_count = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            success_count,
            error_count: outcomes.len() - success_count,
            outcomes,
        }
    }

    /// Number of files attempted.
    pub fn total(&self) -> usize {
        self.success_count + self.error_count
    }

    pub fn is_complete_success(&self) -> bool {
        self.error_count == 0 && self.success_count > 0
    }

    /// Some files succeeded and some failed.
    pub fn is_partial_failure(&self) -> bool {
        self.success_count > 0 && self.error_count > 0
    }

    pub fn all_failed(&self) -> bool {
        self.success_count == 0
    }

    /// Images created by this batch.
    pub fn images(&self) -> impl Iterator<Item = &Image> {
        self.outcomes.iter().filter_map(|o| match o {
            UploadOutcome::Succeeded(image) => Some(image),
            UploadOutcome::Failed { .. } => None,
        })
    }

    /// Operator-facing summary of the batch.
    pub fn summary(&self) -> String {
        if self.is_complete_success() {
            format!("Uploaded {} image(s).", self.success_count)
        } else if self.is_partial_failure() {
            format!(
                "Uploaded {} image(s), {} failed.",
                self.success_count, self.error_count
            )
        } else {
            "Failed to upload all images.".to_string()
        }
    }
}

/// Runs the per-file ingestion steps for a batch.
pub struct IngestPipeline<'a> {
    db: &'a Database,
    storage: &'a dyn ObjectStorage,
    options: CompressOptions,
    concurrency: usize,
}

impl<'a> IngestPipeline<'a> {
    /// Create a pipeline with default compression bounds, one file at a time.
    pub fn new(db: &'a Database, storage: &'a dyn ObjectStorage) -> Self {
        Self {
            db,
            storage,
            options: CompressOptions::default(),
            concurrency: 1,
        }
    }

    /// Apply compression bounds and concurrency from configuration.
    pub fn with_config(mut self, config: &IngestConfig) -> Self {
        self.options = CompressOptions::from(config);
        self.concurrency = config.concurrency.max(1);
        self
    }

    pub fn with_options(mut self, options: CompressOptions) -> Self {
        self.options = options;
        self
    }

    /// Number of files processed at the same time.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Ingest `files` into the folder `folder_id`.
    ///
    /// Fails with a validation error, before touching storage or the store,
    /// when `files` is empty or the folder doesn't exist. Otherwise every
    /// file is attempted and the call returns the aggregated outcomes.
    pub async fn ingest(&self, folder_id: i64, files: Vec<SourceFile>) -> Result<BatchResult> {
        if files.is_empty() {
            return Err(GalleryError::Validation(
                "select at least one image to upload".to_string(),
            ));
        }

        let repo = ContentRepository::new(self.db);
        if repo.get_folder(folder_id).await?.is_none() {
            return Err(GalleryError::Validation(format!(
                "folder {folder_id} does not exist"
            )));
        }

        let batch_ms = batch_timestamp_ms();
        info!(folder_id, files = files.len(), "starting upload batch");

        let outcomes: Vec<UploadOutcome> = stream::iter(files.into_iter().enumerate())
            .map(|(index, file)| self.process_file(&repo, folder_id, batch_ms, index, file))
            .buffered(self.concurrency)
            .collect()
            .await;

        let result = BatchResult::from_outcomes(outcomes);
        info!(
            folder_id,
            succeeded = result.success_count,
            failed = result.error_count,
            "upload batch finished"
        );
        Ok(result)
    }

    async fn process_file(
        &self,
        repo: &ContentRepository<'_>,
        folder_id: i64,
        batch_ms: i64,
        index: usize,
        file: SourceFile,
    ) -> UploadOutcome {
        let filename = file.filename.clone();
        match self.run_steps(repo, folder_id, batch_ms, index, file).await {
            Ok(image) => UploadOutcome::Succeeded(image),
            Err(e) => {
                warn!(index, file = %filename, error = %e, "image upload failed");
                UploadOutcome::Failed {
                    filename,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn run_steps(
        &self,
        repo: &ContentRepository<'_>,
        folder_id: i64,
        batch_ms: i64,
        index: usize,
        file: SourceFile,
    ) -> Result<Image> {
        let title = title_from_filename(&file.filename);
        let original_size = file.content.len();

        let compressed = self.compress_on_worker(file).await?;
        debug!(
            index,
            original_size,
            compressed_size = compressed.bytes.len(),
            "compressed image"
        );

        let key = storage_key(batch_ms, index, &compressed.filename);
        self.storage
            .upload(&key, &compressed.bytes, compressed.content_type)
            .await?;

        let url = self.storage.public_url(&key);
        repo.insert_image(folder_id, &title, &url).await
    }

    async fn compress_on_worker(&self, file: SourceFile) -> Result<CompressedImage> {
        let options = self.options;
        tokio::task::spawn_blocking(move || compress(&file.content, &file.filename, &options))
            .await
            .map_err(|e| GalleryError::Image(format!("compression worker failed: {e}")))?
    }
}
