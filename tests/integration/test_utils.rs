//! Test utilities for integration tests.
//!
//! Provides an in-memory upstream and image fixtures.

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thumb_proxy::error::RetrievalError;
use thumb_proxy::upstream::UpstreamFetcher;

// =============================================================================
// Mock Fetcher
// =============================================================================

/// In-memory upstream keyed by full URL.
///
/// Unknown URLs answer like an upstream 404. Tracks fetch count for
/// verifying the pipeline short-circuits.
#[derive(Clone, Default)]
pub struct MockFetcher {
    images: HashMap<String, Bytes>,
    fetch_count: Arc<AtomicUsize>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, url: impl Into<String>, data: Vec<u8>) -> Self {
        self.images.insert(url.into(), Bytes::from(data));
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Shared counter, readable after the fetcher moves into a router.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetch_count)
    }
}

#[async_trait]
impl UpstreamFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, RetrievalError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| RetrievalError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

// =============================================================================
// Image Fixtures
// =============================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 255) / width.max(1)) as u8,
            ((y * 255) / height.max(1)) as u8,
            128,
        ])
    })
}

/// Create a PNG of the given size.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("Failed to encode PNG");
    buf.into_inner()
}

/// Create a JPEG of the given size.
pub fn create_test_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode_image(&gradient(width, height))
        .expect("Failed to encode JPEG");
    buf
}

/// Decode an image and return its dimensions.
pub fn image_dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(data).expect("Response should be a decodable image");
    (img.width(), img.height())
}

/// Check if data is a valid PNG.
pub fn is_valid_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G'])
}

/// Check if data is a valid JPEG (starts with SOI, ends with EOI).
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() >= 4
        && data[0] == 0xFF
        && data[1] == 0xD8
        && data[data.len() - 2] == 0xFF
        && data[data.len() - 1] == 0xD9
}
