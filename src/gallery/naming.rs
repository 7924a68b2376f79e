//! Naming rules for ingested images.
//!
//! - title: source filename without its extension (`Senam Pagi.png` → `Senam Pagi`)
//! - storage key: `img_<batch-epoch-ms>_<index-in-batch>_<compressed filename>`
//! - download name: `<title>.jpg`, whatever the stored encoding is

use chrono::Utc;

/// Prefix of every storage key written by the ingestion pipeline.
pub const KEY_PREFIX: &str = "img";

/// Extension offered for downloads.
pub const DOWNLOAD_EXTENSION: &str = "jpg";

/// Strip any client-side directory part (`C:\fakepath\a.jpg`, `dir/a.jpg`).
pub fn base_name(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

/// Derive an image title from its source filename by removing the last extension.
///
/// A leading dot does not start an extension, so `.hidden` stays `.hidden`.
pub fn title_from_filename(filename: &str) -> String {
    let name = base_name(filename);
    match name.rfind('.') {
        Some(pos) if pos > 0 => name[..pos].to_string(),
        _ => name.to_string(),
    }
}

/// Filename of the compressed output: the source title with the encoder's extension.
pub fn compressed_filename(source_filename: &str, extension: &str) -> String {
    let title = title_from_filename(source_filename);
    if title.is_empty() {
        format!("image.{extension}")
    } else {
        format!("{title}.{extension}")
    }
}

/// Storage key for one file of a batch.
///
/// `batch_epoch_ms` is captured once per batch and the index keeps keys of
/// the same batch apart, so repeated uploads of one filename never collide.
pub fn storage_key(batch_epoch_ms: i64, index: usize, compressed_filename: &str) -> String {
    format!("{KEY_PREFIX}_{batch_epoch_ms}_{index}_{compressed_filename}")
}

/// Milliseconds since the Unix epoch, used as the batch part of storage keys.
pub fn batch_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Local filename offered when downloading an image.
pub fn download_filename(title: &str) -> String {
    format!("{title}.{DOWNLOAD_EXTENSION}")
}
