use std::error::Error as StdError;
use std::fmt::Write as _;

use thiserror::Error;

/// Errors that can occur while retrieving the upstream image
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    /// The embedded upstream URL could not be parsed or uses an unsupported scheme
    #[error("Invalid upstream URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The upstream did not answer within the configured timeout
    #[error("Upstream request to {url} timed out")]
    Timeout { url: String },

    /// Network or connection error
    #[error("Connection error fetching {url}: {message}")]
    Connection { url: String, message: String },

    /// Upstream answered with a non-success status
    #[error("Upstream {url} responded with status {status}")]
    Status { url: String, status: u16 },

    /// Reading the upstream body failed part way
    #[error("Failed to read upstream body from {url}: {message}")]
    Body { url: String, message: String },

    /// The working buffer could not be written
    #[error("Failed to write working image: {0}")]
    Buffer(String),
}

/// Errors raised while resizing the working image
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    /// The resize spec could not be turned into dimensions
    #[error("Invalid resize spec '{spec}': {reason}")]
    InvalidDimensions { spec: String, reason: String },

    /// The working image could not be probed or decoded
    #[error("Unreadable image: {0}")]
    Unreadable(String),

    /// Writing the transformed image failed
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// The blocking transform task did not complete
    #[error("Transform task failed: {0}")]
    Task(String),
}

/// Signature rejection. The default validator never produces it.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Signature rejected")]
    Unauthorized,
}

/// Terminal failure of a proxy request, surfaced as a 500 response.
#[derive(Debug, Clone, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl ProxyError {
    /// Pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            ProxyError::Retrieval(_) => "retrieve_upstream",
            ProxyError::Transform(_) => "transform_image",
        }
    }

    /// Diagnostic trace written after the message in 500 bodies.
    ///
    /// Always non-empty: the failing stage, the debug form of the error and
    /// every source in its chain, one per line.
    pub fn trace(&self) -> String {
        let mut trace = String::new();
        let _ = writeln!(trace, "stage: {}", self.stage());
        let _ = write!(trace, "error: {:?}", self);

        let mut source = StdError::source(self);
        while let Some(cause) = source {
            let _ = write!(trace, "\ncaused by: {}", cause);
            source = cause.source();
        }
        trace
    }
}
