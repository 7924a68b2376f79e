//! Gallery core: folders and images, ingestion, deletion, and the viewer.

pub mod compress;
mod deletion;
mod folder;
mod image;
mod ingest;
pub mod naming;
mod repository;
mod viewer;

pub use compress::{compress, fit_within, CompressOptions, CompressedImage};
pub use deletion::{DeletionCoordinator, FolderDeletion};
pub use folder::{Folder, FolderRepository, NewFolder};
pub use self::image::{Image, ImageRepository, NewImage};
pub use ingest::{BatchResult, IngestPipeline, SourceFile, UploadOutcome};
pub use repository::{Catalog, ContentRepository, GalleryFolder};
pub use viewer::{Download, GalleryViewer, Thumbnail, ViewerState};
