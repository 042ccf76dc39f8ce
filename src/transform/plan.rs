//! Resize geometry.
//!
//! Pure functions mapping source dimensions, clamped target bounds and a
//! gravity to the output size an [`ImageProcessor`](super::ImageProcessor)
//! scales to. Plans keep the aspect ratio and never exceed the source on
//! either axis.

use crate::request::{Gravity, TargetDimensions};

/// Scale to `width` x `height`.
///
/// `gravity` is carried for backends that anchor on it; a plain fit-inside
/// scale does not consult it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub width: u32,
    pub height: u32,
    pub gravity: Gravity,
}

impl ResizePlan {
    /// Final output dimensions.
    pub fn output_dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether applying the plan would leave an image of `source` size unchanged.
    pub fn is_identity(&self, source: (u32, u32)) -> bool {
        (self.width, self.height) == source
    }
}

/// Compute the resize for `source` bounded by `target`.
///
/// - One bound: scale to it, keeping the aspect ratio.
/// - Both bounds: fit inside the box, keeping the aspect ratio. Nothing is
///   cropped, so one side may end up smaller than its bound.
/// - No bound, or a degenerate source: `None`.
pub fn plan_resize(
    source: (u32, u32),
    target: TargetDimensions,
    gravity: Gravity,
) -> Option<ResizePlan> {
    let (source_width, source_height) = source;
    if source_width == 0 || source_height == 0 {
        return None;
    }

    let (width, height) = match (target.width, target.height) {
        (None, None) => return None,
        (Some(width), None) => {
            let width = width.clamp(1, source_width);
            let height = scale_side(source_height, width as f64 / source_width as f64);
            (width, height)
        }
        (None, Some(height)) => {
            let height = height.clamp(1, source_height);
            let width = scale_side(source_width, height as f64 / source_height as f64);
            (width, height)
        }
        (Some(box_width), Some(box_height)) => {
            let box_width = box_width.clamp(1, source_width);
            let box_height = box_height.clamp(1, source_height);
            let scale = f64::min(
                box_width as f64 / source_width as f64,
                box_height as f64 / source_height as f64,
            );
            (
                scale_side(source_width, scale).min(box_width),
                scale_side(source_height, scale).min(box_height),
            )
        }
    };

    Some(ResizePlan {
        width,
        height,
        gravity,
    })
}

fn scale_side(side: u32, scale: f64) -> u32 {
    ((side as f64 * scale).round() as u32).clamp(1, side)
}
