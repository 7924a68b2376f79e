//! Full-size viewer over one folder's images.
//!
//! The viewer is either closed or open on a folder at a position. Navigation
//! wraps around in both directions.

use tracing::{debug, info};

use super::image::Image;
use super::naming::download_filename;
use super::repository::GalleryFolder;
use crate::storage::ObjectStorage;
use crate::{GalleryError, Result};

/// Viewer state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewerState {
    #[default]
    Closed,
    Open {
        folder: GalleryFolder,
        index: usize,
    },
}

/// A downloaded image ready to be saved locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Suggested local filename (`<title>.jpg`).
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// One entry of the thumbnail strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thumbnail<'a> {
    pub index: usize,
    pub image: &'a Image,
    /// Whether this is the image shown full size.
    pub is_current: bool,
}

/// Viewer state machine.
#[derive(Debug, Default)]
pub struct GalleryViewer {
    state: ViewerState,
}

impl GalleryViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ViewerState::Open { .. })
    }

    /// Open `folder` at its first (newest) image.
    ///
    /// A folder without images can't be opened; the current state is kept.
    pub fn select_folder(&mut self, folder: GalleryFolder) -> Result<()> {
        if folder.is_empty() {
            return Err(GalleryError::Validation(format!(
                "folder \"{}\" has no images",
                folder.name()
            )));
        }

        info!(folder_id = folder.id(), images = folder.image_count(), "viewer opened");
        self.state = ViewerState::Open { folder, index: 0 };
        Ok(())
    }

    /// Advance to the next image, wrapping from the last to the first.
    pub fn next(&mut self) {
        if let ViewerState::Open { folder, index } = &mut self.state {
            *index = (*index + 1) % folder.images.len();
            debug!(index = *index, "viewer next");
        }
    }

    /// Go back one image, wrapping from the first to the last.
    pub fn previous(&mut self) {
        if let ViewerState::Open { folder, index } = &mut self.state {
            let len = folder.images.len();
            *index = (*index + len - 1) % len;
            debug!(index = *index, "viewer previous");
        }
    }

    /// Jump directly to `target`.
    pub fn select_thumbnail(&mut self, target: usize) -> Result<()> {
        match &mut self.state {
            ViewerState::Open { folder, index } => {
                if target >= folder.images.len() {
                    return Err(GalleryError::Validation(format!(
                        "thumbnail {target} out of range (folder has {} images)",
                        folder.images.len()
                    )));
                }
                *index = target;
                Ok(())
            }
            ViewerState::Closed => Err(GalleryError::Validation(
                "viewer is not open".to_string(),
            )),
        }
    }

    /// Close the viewer. Closing a closed viewer does nothing.
    pub fn close(&mut self) {
        if self.is_open() {
            debug!("viewer closed");
        }
        self.state = ViewerState::Closed;
    }

    pub fn current_image(&self) -> Option<&Image> {
        match &self.state {
            ViewerState::Open { folder, index } => folder.images.get(*index),
            ViewerState::Closed => None,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match &self.state {
            ViewerState::Open { index, .. } => Some(*index),
            ViewerState::Closed => None,
        }
    }

    pub fn current_folder(&self) -> Option<&GalleryFolder> {
        match &self.state {
            ViewerState::Open { folder, .. } => Some(folder),
            ViewerState::Closed => None,
        }
    }

    /// One-based position and total, e.g. `(3, 7)` for "3 / 7".
    pub fn position(&self) -> Option<(usize, usize)> {
        match &self.state {
            ViewerState::Open { folder, index } => Some((index + 1, folder.images.len())),
            ViewerState::Closed => None,
        }
    }

    /// Thumbnail strip of the open folder. Empty while closed.
    pub fn thumbnails(&self) -> Vec<Thumbnail<'_>> {
        match &self.state {
            ViewerState::Open { folder, index } => folder
                .images
                .iter()
                .enumerate()
                .map(|(i, image)| Thumbnail {
                    index: i,
                    image,
                    is_current: i == *index,
                })
                .collect(),
            ViewerState::Closed => Vec::new(),
        }
    }

    /// Whether navigation controls make sense (more than one image).
    pub fn has_navigation(&self) -> bool {
        self.current_folder()
            .is_some_and(|folder| folder.image_count() > 1)
    }

    /// Fetch the current image for saving locally. The viewer state is unchanged.
    pub async fn download(&self, storage: &dyn ObjectStorage) -> Result<Download> {
        let image = self
            .current_image()
            .ok_or_else(|| GalleryError::Validation("viewer is not open".to_string()))?;

        let bytes = storage.fetch(&image.image_url).await.map_err(|e| match e {
            GalleryError::Storage(_) => e,
            other => GalleryError::Storage(other.to_string()),
        })?;

        info!(image_id = image.id, size = bytes.len(), "image downloaded");
        Ok(Download {
            filename: download_filename(&image.title),
            bytes,
        })
    }
}
