//! Resize spec parsing and the never-upscale clamp.

use std::num::NonZeroU32;

use crate::error::TransformError;

/// Requested bounds parsed from a `WxH` token. `None` leaves that axis
/// unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeSpec {
    pub width: Option<NonZeroU32>,
    pub height: Option<NonZeroU32>,
}

impl ResizeSpec {
    /// Parse `WxH`, `Wx`, `xH` or `x`.
    ///
    /// The token is split on every `x` and only the first two fields count,
    /// so `20xxx30` bounds the width alone. Each field contributes its
    /// leading digits: a field without any (empty, or starting with `:`)
    /// is `0`, which leaves the axis unconstrained. Values too large for
    /// `u32` saturate and are later clamped to the source size.
    pub fn parse(spec: &str) -> Result<Self, TransformError> {
        if !spec.contains('x') {
            return Err(invalid(spec, "missing 'x' separator"));
        }

        let mut fields = spec.split('x');
        let width = fields.next().map(leading_integer).unwrap_or(0);
        let height = fields.next().map(leading_integer).unwrap_or(0);

        Ok(Self {
            width: NonZeroU32::new(width),
            height: NonZeroU32::new(height),
        })
    }

    /// Whether neither axis is constrained.
    pub fn is_unbounded(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// Value of the leading run of ASCII digits, saturating at `u32::MAX`.
fn leading_integer(field: &str) -> u32 {
    field
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |value, digit| {
            value
                .saturating_mul(10)
                .saturating_add(u32::from(digit - b'0'))
        })
}

fn invalid(spec: &str, reason: &str) -> TransformError {
    TransformError::InvalidDimensions {
        spec: spec.to_string(),
        reason: reason.to_string(),
    }
}

/// Final bounds after clamping a [`ResizeSpec`] to the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl TargetDimensions {
    /// Clamp each requested side to the matching source dimension.
    pub fn clamp_to(spec: ResizeSpec, source: (u32, u32)) -> Self {
        let (source_width, source_height) = source;
        Self {
            width: spec.width.map(|w| w.get().min(source_width)),
            height: spec.height.map(|h| h.get().min(source_height)),
        }
    }
}
