//! # Thumb Proxy
//!
//! An HTTP service that fetches images from arbitrary upstream URLs and
//! returns them, optionally resized, in a single request.
//!
//! The upstream URL is embedded in the request path, together with an
//! optional signature segment, a `WxH` resize spec and a gravity code:
//!
//! ```text
//! GET /{signature}?/{width}x{height}{gravity}?/{upstream url}
//! ```
//!
//! ## Architecture
//!
//! - [`request`] - path repair, route matching and proxy URL building
//! - [`upstream`] - fetching upstream bytes into a working image
//! - [`transform`] - resize planning and the image backend
//! - [`proxy`] - the per-request pipeline and response formatting
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use thumb_proxy::{create_router, HttpFetcher, ProxyConfig, RasterProcessor, RouterConfig, ThumbProxy};
//! use thumb_proxy::upstream::DEFAULT_UPSTREAM_TIMEOUT;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpFetcher::new(DEFAULT_UPSTREAM_TIMEOUT)?;
//!     let proxy = ThumbProxy::new(fetcher, RasterProcessor::default(), ProxyConfig::default());
//!     let router = create_router(proxy, RouterConfig::default());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod proxy;
pub mod request;
pub mod server;
pub mod transform;
pub mod upstream;

// Re-export commonly used types
pub use config::{Cli, Command, ServeConfig, UrlConfig};
pub use error::{AuthError, ProxyError, RetrievalError, TransformError};
pub use proxy::{ProxyConfig, ProxyResponse, SignatureValidator, ThumbProxy};
pub use request::{match_route, Gravity, RequestDescriptor, ResizeSpec, RouteMatch, ThumbUrl};
pub use server::{create_router, health_handler, proxy_handler, AppState, RouterConfig};
pub use transform::{ImageProcessor, RasterProcessor};
pub use upstream::{HttpFetcher, UpstreamFetcher, WorkingImage};
