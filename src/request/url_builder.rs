//! Builder for proxy paths pointing at an upstream image.
//!
//! ```
//! use thumb_proxy::request::{Gravity, ThumbUrl};
//!
//! let path = ThumbUrl::new("http://example.com/a.png")
//!     .with_width(200)
//!     .with_gravity(Gravity::SouthEast)
//!     .path();
//! assert_eq!(path, "/200xse/http%3A%2F%2Fexample.com%2Fa.png");
//! ```

use super::gravity::Gravity;

/// Proxy path or URL for a thumbnail of `upstream`.
///
/// Never emits a signature segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbUrl {
    upstream: String,
    width: Option<u32>,
    height: Option<u32>,
    gravity: Option<Gravity>,
    base_url: Option<String>,
}

impl ThumbUrl {
    pub fn new(upstream: impl Into<String>) -> Self {
        Self {
            upstream: upstream.into(),
            width: None,
            height: None,
            gravity: None,
            base_url: None,
        }
    }

    /// Bound the thumbnail width. `0` leaves it unconstrained.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width).filter(|&w| w > 0);
        self
    }

    /// Bound the thumbnail height. `0` leaves it unconstrained.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height).filter(|&h| h > 0);
        self
    }

    pub fn with_gravity(mut self, gravity: Gravity) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Prefix for [`ThumbUrl::to_url`], e.g. `https://thumbs.example.com`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// The resize token, `None` when neither side is bounded.
    pub fn resize_token(&self) -> Option<String> {
        if self.width.is_none() && self.height.is_none() {
            return None;
        }
        let side = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_default();
        Some(format!("{}x{}", side(self.width), side(self.height)))
    }

    /// Absolute path understood by the proxy router.
    pub fn path(&self) -> String {
        let mut options = self.resize_token().unwrap_or_default();
        if let Some(gravity) = self.gravity {
            options.push_str(gravity.code());
        }

        let escaped = urlencoding::encode(&self.upstream);
        if options.is_empty() {
            format!("/{}", escaped)
        } else {
            format!("/{}/{}", options, escaped)
        }
    }

    /// Full URL when a base URL is configured, otherwise the bare path.
    pub fn to_url(&self) -> String {
        match &self.base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), self.path()),
            None => self.path(),
        }
    }
}
