//! Request decoding.
//!
//! Turns a raw request path into a [`RequestDescriptor`]:
//!
//! ```text
//! raw path ──► extract_path ──► match_route ──► RequestDescriptor
//!              (repair http:/)   (grammar)        │
//!                                                 ├─ ResizeSpec ──► TargetDimensions
//!                                                 └─ Gravity
//! ```
//!
//! [`ThumbUrl`] goes the other way and builds proxy paths for an upstream URL.

mod gravity;
mod path;
mod resize;
mod route;
mod url_builder;

pub use gravity::{Gravity, GRAVITY_CODES};
pub use path::extract_path;
pub use resize::{ResizeSpec, TargetDimensions};
pub use route::{match_route, RequestDescriptor, RouteMatch, SIGNATURE_LEN};
pub use url_builder::ThumbUrl;
