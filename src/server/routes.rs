//! Router configuration for the thumbnail proxy.
//!
//! # Route Structure
//!
//! ```text
//! /health                                          - Health check
//! /{signature}?/{resize}{gravity}?/{upstream url}  - Proxy (fallback)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use thumb_proxy::proxy::{ProxyConfig, ThumbProxy};
//! use thumb_proxy::server::{create_router, RouterConfig};
//! use thumb_proxy::transform::RasterProcessor;
//! use thumb_proxy::upstream::{HttpFetcher, DEFAULT_UPSTREAM_TIMEOUT};
//!
//! let fetcher = HttpFetcher::new(DEFAULT_UPSTREAM_TIMEOUT)?;
//! let proxy = ThumbProxy::new(fetcher, RasterProcessor::default(), ProxyConfig::default());
//! let router = create_router(proxy, RouterConfig::default());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, proxy_handler, AppState};
use crate::proxy::ThumbProxy;
use crate::transform::ImageProcessor;
use crate::upstream::UpstreamFetcher;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    /// Any CORS origin, tracing enabled.
    fn default() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
        }
    }
}

impl RouterConfig {
    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// `/health` is served directly; every other path goes to the proxy, so
/// that upstream URLs containing slashes reach the matcher unchanged.
pub fn create_router<F, P>(proxy: ThumbProxy<F, P>, config: RouterConfig) -> Router
where
    F: UpstreamFetcher + 'static,
    P: ImageProcessor,
{
    let app_state = AppState::new(proxy);
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/health", get(health_handler))
        .fallback(proxy_handler::<F, P>)
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
