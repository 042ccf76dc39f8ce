//! Image processing backend.
//!
//! The proxy talks to image decoding and resizing through [`ImageProcessor`].
//! [`RasterProcessor`] is the bundled implementation on top of the `image`
//! crate. It works on the working image file in place.
//!
//! # Design Decisions
//!
//! - **Same format out as in**: the transformed image is re-encoded in the
//!   format detected from its bytes. The response content type still comes
//!   from the requested URL.
//!
//! - **First frame only**: animated GIFs are flattened to their first frame.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};

use super::plan::ResizePlan;
use crate::error::TransformError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// External image capability used by the transform stage.
///
/// Implementations are called from a blocking thread.
pub trait ImageProcessor: Send + Sync + 'static {
    /// Native `(width, height)` of the image stored at `path`.
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), TransformError>;

    /// Apply `plan` to the image at `path`, overwriting it.
    fn resize(&self, path: &Path, plan: &ResizePlan) -> Result<(), TransformError>;
}

// =============================================================================
// Raster Processor
// =============================================================================

/// [`ImageProcessor`] backed by the `image` crate.
#[derive(Debug, Clone)]
pub struct RasterProcessor {
    jpeg_quality: u8,
    filter: FilterType,
}

impl Default for RasterProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl RasterProcessor {
    /// Create a processor encoding JPEG output at `jpeg_quality` (clamped to 1-100).
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: clamp_quality(jpeg_quality),
            filter: FilterType::Lanczos3,
        }
    }

    /// Use a different resampling filter.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    fn open(path: &Path) -> Result<(DynamicImage, ImageFormat), TransformError> {
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| TransformError::Unreadable(e.to_string()))?;

        let format = reader
            .format()
            .ok_or_else(|| TransformError::Unreadable("unrecognized image format".to_string()))?;

        let image = reader
            .decode()
            .map_err(|e| TransformError::Unreadable(e.to_string()))?;

        Ok((image, format))
    }

    fn write(
        &self,
        path: &Path,
        image: &DynamicImage,
        format: ImageFormat,
    ) -> Result<(), TransformError> {
        let file = File::create(path).map_err(|e| TransformError::Encode(e.to_string()))?;
        let mut writer = BufWriter::new(file);

        let result = match format {
            ImageFormat::Jpeg => {
                let mut encoder = JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality);
                encoder.encode_image(&image.to_rgb8())
            }
            ImageFormat::Gif => {
                DynamicImage::ImageRgba8(image.to_rgba8()).write_to(&mut writer, format)
            }
            _ => image.write_to(&mut writer, format),
        };
        result.map_err(|e| TransformError::Encode(e.to_string()))?;

        writer
            .flush()
            .map_err(|e| TransformError::Encode(e.to_string()))
    }
}

impl ImageProcessor for RasterProcessor {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), TransformError> {
        ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| TransformError::Unreadable(e.to_string()))?
            .into_dimensions()
            .map_err(|e| TransformError::Unreadable(e.to_string()))
    }

    fn resize(&self, path: &Path, plan: &ResizePlan) -> Result<(), TransformError> {
        let (image, format) = Self::open(path)?;

        let output = image.resize_exact(plan.width, plan.height, self.filter);
        self.write(path, &output, format)
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate JPEG quality parameter.
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
