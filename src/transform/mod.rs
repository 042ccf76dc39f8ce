//! Image transform stage.
//!
//! ```text
//! resize spec ──► ResizeSpec ──┐
//!                              ├─► TargetDimensions ──► plan_resize ──► ImageProcessor::resize
//! working image ─► dimensions ─┘        (clamp)          (+ gravity)      (in place)
//! ```
//!
//! The stage is a no-op when the request carries no resize spec, which is
//! the plain proxying fast path.

mod plan;
mod processor;

use std::sync::Arc;

use tracing::debug;

pub use plan::{plan_resize, ResizePlan};
pub use processor::{
    clamp_quality, is_valid_quality, ImageProcessor, RasterProcessor, DEFAULT_JPEG_QUALITY,
    MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};

use crate::error::TransformError;
use crate::request::{Gravity, RequestDescriptor, ResizeSpec, TargetDimensions};
use crate::upstream::WorkingImage;

/// Resize `working` in place according to `descriptor`.
///
/// The working image is handed back on success. On failure it is dropped,
/// which releases the backing file.
pub async fn transform_image<P: ImageProcessor>(
    processor: Arc<P>,
    working: WorkingImage,
    descriptor: &RequestDescriptor,
) -> Result<WorkingImage, TransformError> {
    let Some(spec) = descriptor.resize_spec() else {
        return Ok(working);
    };

    let requested = ResizeSpec::parse(spec)?;
    let gravity = descriptor.gravity();

    tokio::task::spawn_blocking(move || apply(processor.as_ref(), working, requested, gravity))
        .await
        .map_err(|e| TransformError::Task(e.to_string()))?
}

fn apply<P: ImageProcessor>(
    processor: &P,
    working: WorkingImage,
    requested: ResizeSpec,
    gravity: Gravity,
) -> Result<WorkingImage, TransformError> {
    let source = processor.dimensions(working.path())?;
    let target = TargetDimensions::clamp_to(requested, source);

    match plan_resize(source, target, gravity) {
        Some(plan) if !plan.is_identity(source) => {
            debug!(
                source_width = source.0,
                source_height = source.1,
                width = plan.output_dimensions().0,
                height = plan.output_dimensions().1,
                gravity = %gravity,
                "Resizing image"
            );
            processor.resize(working.path(), &plan)?;
        }
        _ => debug!(
            source_width = source.0,
            source_height = source.1,
            "Resize leaves image unchanged"
        ),
    }

    Ok(working)
}
