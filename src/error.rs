//! Error types for the gallery core.

use thiserror::Error;

/// Common error type for gallery operations.
///
/// The variants map onto the operator-facing error kinds: bad input
/// (`Validation`), data store failures (`Repository`) and object storage
/// failures (`Storage`). Deletion relies on the last two being distinct,
/// since each leaves a different inconsistency behind.
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Validation error for caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Data store read/write failure.
    ///
    /// Errors from sqlx are automatically converted.
    #[error("metadata store error: {0}")]
    Repository(String),

    /// Object storage upload/download/remove failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Image decode or encode failure during compression.
    #[error("image error: {0}")]
    Image(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(#[from] crate::auth::AuthError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GalleryError {
    /// Whether this error came from the object storage service.
    pub fn is_storage(&self) -> bool {
        matches!(self, GalleryError::Storage(_))
    }

    /// Whether this error came from the metadata store.
    pub fn is_repository(&self) -> bool {
        matches!(self, GalleryError::Repository(_))
    }
}

impl From<sqlx::Error> for GalleryError {
    fn from(e: sqlx::Error) -> Self {
        GalleryError::Repository(e.to_string())
    }
}

impl From<image::ImageError> for GalleryError {
    fn from(e: image::ImageError) -> Self {
        GalleryError::Image(e.to_string())
    }
}

/// Result type alias for gallery operations.
pub type Result<T> = std::result::Result<T, GalleryError>;
