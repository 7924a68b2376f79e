//! Ponkesdes gallery core.
//!
//! Folders of images backed by a metadata store and an object storage
//! service, with a compress-and-upload ingestion pipeline, coordinated
//! deletion, and a circular image viewer.

pub mod admin;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gallery;
pub mod logging;
pub mod storage;

#[cfg(test)]
mod test_helpers;

pub use admin::{GalleryAdmin, MessageKind, OperatorMessage};
pub use auth::{AdminSession, AuthError, Authenticator, StaticAuthenticator, User};
pub use config::Config;
pub use db::Database;
pub use error::{GalleryError, Result};
pub use gallery::{
    BatchResult, Catalog, ContentRepository, DeletionCoordinator, Download, Folder,
    FolderDeletion, GalleryFolder, GalleryViewer, Image, IngestPipeline, SourceFile,
    Thumbnail, UploadOutcome, ViewerState,
};
pub use storage::{LocalStorage, ObjectStorage, SupabaseStorage};
