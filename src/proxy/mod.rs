//! Proxy pipeline layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          ThumbProxy                             │
//! │                                                                 │
//! │  route ─► signature ─► UpstreamFetcher ─► transform ─► response │
//! │           (hook)       (WorkingImage)     (ImageProcessor)      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod response;
mod service;
mod signature;

pub use response::{content_type_for, ProxyResponse, DEFAULT_CONTENT_TYPE};
pub use service::{ProxyConfig, ThumbProxy, DEFAULT_CACHE_CONTROL};
pub use signature::{AcceptAllSignatures, SignatureValidator};
