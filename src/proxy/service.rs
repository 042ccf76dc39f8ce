//! The request pipeline.
//!
//! One call to [`ThumbProxy::handle`] per inbound request:
//!
//! 1. repair the raw path
//! 2. match it against the proxy grammar (miss → 404)
//! 3. consult the signature hook (reject → 401)
//! 4. fetch the upstream into a fresh [`WorkingImage`]
//! 5. resize it in place when the path asks for it
//! 6. format the response
//!
//! Fetch and transform failures end the request with a 500. The working
//! image lives only for the duration of the call.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use http::header::CACHE_CONTROL;
use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use super::response::ProxyResponse;
use super::signature::{AcceptAllSignatures, SignatureValidator};
use crate::error::{ProxyError, RetrievalError};
use crate::request::{extract_path, match_route, RequestDescriptor, RouteMatch};
use crate::transform::{transform_image, ImageProcessor};
use crate::upstream::{UpstreamFetcher, WorkingImage};

/// Default `Cache-Control` value sent with proxied images (one day).
pub const DEFAULT_CACHE_CONTROL: &str = "max-age=86400, public";

// =============================================================================
// Proxy Configuration
// =============================================================================

/// Read-only settings shared by every request.
///
/// Built once at startup and handed to [`ThumbProxy::new`]; never mutated
/// afterwards.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Headers merged into every successful response, last
    pub cache_headers: HeaderMap,

    /// Whether signatures are expected on incoming paths
    pub signatures_in_use: bool,

    /// Directory for working images (None = system temp dir)
    pub temp_dir: Option<PathBuf>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        let mut cache_headers = HeaderMap::new();
        cache_headers.insert(CACHE_CONTROL, HeaderValue::from_static(DEFAULT_CACHE_CONTROL));
        Self {
            cache_headers,
            signatures_in_use: false,
            temp_dir: None,
        }
    }
}

impl ProxyConfig {
    /// Replace the cache headers.
    pub fn with_cache_headers(mut self, headers: HeaderMap) -> Self {
        self.cache_headers = headers;
        self
    }

    /// Add or replace a single cache header.
    pub fn with_cache_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.cache_headers.insert(name, value);
        self
    }

    pub fn with_signatures_in_use(mut self, enabled: bool) -> Self {
        self.signatures_in_use = enabled;
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}

// =============================================================================
// Thumb Proxy
// =============================================================================

/// The thumbnailing pipeline.
///
/// Generic over the upstream source and the image backend. Holds no
/// per-request state, so one instance serves all requests concurrently.
pub struct ThumbProxy<F, P> {
    fetcher: F,
    processor: Arc<P>,
    validator: Arc<dyn SignatureValidator>,
    config: ProxyConfig,
}

impl<F, P> ThumbProxy<F, P>
where
    F: UpstreamFetcher,
    P: ImageProcessor,
{
    /// Create a proxy accepting all signatures.
    pub fn new(fetcher: F, processor: P, config: ProxyConfig) -> Self {
        Self {
            fetcher,
            processor: Arc::new(processor),
            validator: Arc::new(AcceptAllSignatures),
            config,
        }
    }

    /// Replace the signature hook.
    pub fn with_validator(mut self, validator: impl SignatureValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run the full pipeline for a raw request path.
    pub async fn handle(&self, raw_path: &str) -> ProxyResponse {
        let path = extract_path(raw_path);

        let descriptor = match match_route(&path) {
            RouteMatch::Matched(descriptor) => descriptor,
            RouteMatch::Miss => {
                debug!(path = %path, "Path does not match proxy grammar");
                return ProxyResponse::not_found();
            }
        };

        if let Err(err) = self
            .validator
            .validate(descriptor.signature_token(), self.config.signatures_in_use)
        {
            warn!(path = %path, error = %err, "Signature rejected");
            return ProxyResponse::unauthorized(&err);
        }

        match self.process(&descriptor).await {
            Ok((url, body)) => {
                debug!(url = %url, bytes = body.len(), "Serving image");
                ProxyResponse::image(&url, body, &self.config.cache_headers)
            }
            Err(err) => {
                error!(
                    stage = err.stage(),
                    url = descriptor.escaped_url(),
                    "Proxy request failed: {}",
                    err
                );
                ProxyResponse::failure(&err)
            }
        }
    }

    /// Fetch, transform and read back. Returns the decoded upstream URL and
    /// the final bytes.
    async fn process(&self, descriptor: &RequestDescriptor) -> Result<(String, Bytes), ProxyError> {
        let url = descriptor.upstream_url()?;

        let working = self.retrieve_upstream(&url).await?;
        let working = transform_image(Arc::clone(&self.processor), working, descriptor).await?;

        let body = working
            .read_all()
            .map_err(|e| RetrievalError::Buffer(e.to_string()))?;
        Ok((url, body))
    }

    async fn retrieve_upstream(&self, url: &str) -> Result<WorkingImage, RetrievalError> {
        let mut working = match &self.config.temp_dir {
            Some(dir) => WorkingImage::new_in(dir),
            None => WorkingImage::new(),
        }
        .map_err(|e| RetrievalError::Buffer(e.to_string()))?;

        let data = self.fetcher.fetch(url).await?;
        working
            .fill(&data)
            .map_err(|e| RetrievalError::Buffer(e.to_string()))?;

        Ok(working)
    }
}
