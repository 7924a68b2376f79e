//! Image compression for the ingestion pipeline.
//!
//! Every source image is decoded, scaled down so its longer edge fits
//! `max_edge`, and re-encoded as JPEG. Quality is lowered step by step until
//! the output fits `max_bytes`; when even `min_quality` is too large the
//! image is shrunk further and the quality ladder starts over.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, GIF, BMP) | `image::load_from_memory` |
//! | Flatten alpha onto white | `DynamicImage::to_rgba8` + per-pixel blend |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode | `image::codecs::jpeg::JpegEncoder::new_with_quality` |

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use tracing::debug;

use super::naming::compressed_filename;
use crate::config::IngestConfig;
use crate::{GalleryError, Result};

/// Content type of compressed output.
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

/// Extension of compressed output.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Quality decrement between encode attempts.
const QUALITY_STEP: u8 = 10;

/// Scale factor applied when the lowest quality is still too large.
const SHRINK_FACTOR: f64 = 0.75;

/// Below this edge length the image is not shrunk any further.
const MIN_EDGE: u32 = 16;

/// Size and quality bounds for compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Output ceiling in bytes.
    pub max_bytes: usize,
    /// Longest edge in pixels.
    pub max_edge: u32,
    /// First quality tried.
    pub initial_quality: u8,
    /// Lowest quality tried before shrinking.
    pub min_quality: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self::from(&IngestConfig::default())
    }
}

impl From<&IngestConfig> for CompressOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            max_bytes: config.max_bytes,
            max_edge: config.max_edge,
            initial_quality: config.initial_quality,
            min_quality: config.min_quality,
        }
    }
}

/// A compressed image ready for upload.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    /// Output filename (`<source title>.jpg`).
    pub filename: String,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
    /// Quality the accepted encode used.
    pub quality: u8,
}

/// Scale `(width, height)` so the longer edge is at most `max_edge`.
///
/// Images already within bounds are returned unchanged; nothing is upscaled.
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_edge || longest == 0 {
        return (width, height);
    }

    let scale = max_edge as f64 / longest as f64;
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w.min(max_edge), h.min(max_edge))
}

/// Qualities to try, highest first, always ending with `min`.
fn quality_ladder(initial: u8, min: u8) -> Vec<u8> {
    let mut ladder = Vec::new();
    let mut quality = initial.max(min);
    while quality > min {
        ladder.push(quality);
        quality = quality.saturating_sub(QUALITY_STEP);
    }
    ladder.push(min);
    ladder
}

/// Composite an image with alpha onto a white background. JPEG has no alpha channel.
fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let a = a as u32;
            ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    })
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    img.write_with_encoder(encoder)?;
    Ok(buf)
}

/// Compress one source image.
///
/// This is CPU-bound; the pipeline runs it on a blocking worker thread.
pub fn compress(
    source: &[u8],
    source_filename: &str,
    options: &CompressOptions,
) -> Result<CompressedImage> {
    let mut decoded = image::load_from_memory(source)?;
    if decoded.color().has_alpha() {
        decoded = DynamicImage::ImageRgb8(flatten_onto_white(&decoded));
    }
    let (src_w, src_h) = decoded.dimensions();

    let (mut width, mut height) = fit_within(src_w, src_h, options.max_edge);
    let ladder = quality_ladder(options.initial_quality, options.min_quality);

    loop {
        let scaled = if (width, height) == (src_w, src_h) {
            decoded.clone()
        } else {
            decoded.resize_exact(width, height, FilterType::Lanczos3)
        };
        let rgb = DynamicImage::ImageRgb8(scaled.to_rgb8());

        for &quality in &ladder {
            let bytes = encode_jpeg(&rgb, quality)?;
            debug!(
                file = source_filename,
                width,
                height,
                quality,
                size = bytes.len(),
                "encode attempt"
            );

            if bytes.len() <= options.max_bytes {
                return Ok(CompressedImage {
                    filename: compressed_filename(source_filename, OUTPUT_EXTENSION),
                    bytes,
                    content_type: OUTPUT_CONTENT_TYPE,
                    width,
                    height,
                    quality,
                });
            }
        }

        if width.max(height) <= MIN_EDGE {
            return Err(GalleryError::Image(format!(
                "{source_filename} cannot be compressed below {} bytes",
                options.max_bytes
            )));
        }

        let next_edge = ((width.max(height) as f64 * SHRINK_FACTOR) as u32).max(MIN_EDGE);
        (width, height) = fit_within(src_w, src_h, next_edge);
    }
}
