//! HTTP request handlers for the thumbnail proxy.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check endpoint
//! - any other path - fed to the proxy pipeline

use std::sync::Arc;

use axum::{extract::State, http::Uri, Json};
use serde::Serialize;

use crate::proxy::{ProxyResponse, ThumbProxy};
use crate::transform::ImageProcessor;
use crate::upstream::UpstreamFetcher;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the proxy pipeline.
pub struct AppState<F, P> {
    pub proxy: Arc<ThumbProxy<F, P>>,
}

impl<F, P> AppState<F, P> {
    pub fn new(proxy: ThumbProxy<F, P>) -> Self {
        Self {
            proxy: Arc::new(proxy),
        }
    }
}

impl<F, P> Clone for AppState<F, P> {
    fn clone(&self) -> Self {
        Self {
            proxy: Arc::clone(&self.proxy),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle proxy requests.
///
/// The raw (still percent-escaped) request path is the whole input. Query
/// strings on the proxy request are ignored; an upstream URL with a query
/// must be percent-escaped into the path.
///
/// # Response
///
/// - `200 OK`: image bytes, `Content-Type` from the upstream extension
/// - `404 Not Found`: path outside the proxy grammar
/// - `500 Internal Server Error`: fetch or transform failed
pub async fn proxy_handler<F, P>(State(state): State<AppState<F, P>>, uri: Uri) -> ProxyResponse
where
    F: UpstreamFetcher + 'static,
    P: ImageProcessor,
{
    state.proxy.handle(uri.path()).await
}

/// Handle health check requests.
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
