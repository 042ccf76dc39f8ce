//! Upstream retrieval.
//!
//! A single GET per proxied request. There is no retry and no caching of
//! upstream bytes; a failed attempt ends the request.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::RetrievalError;

/// Default upstream request timeout.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent to upstream servers.
pub const USER_AGENT: &str = concat!("thumb-proxy/", env!("CARGO_PKG_VERSION"));

/// Source of upstream image bytes.
///
/// The proxy is generic over this so tests and embedders can serve images
/// without a network.
#[async_trait]
pub trait UpstreamFetcher: Send + Sync {
    /// Retrieve the complete body at `url`.
    async fn fetch(&self, url: &str) -> Result<Bytes, RetrievalError>;
}

/// HTTP(S) fetcher built on `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UpstreamFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, RetrievalError> {
        let parsed = parse_upstream_url(url)?;

        debug!(url = %parsed, "Fetching upstream");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                RetrievalError::Timeout {
                    url: url.to_string(),
                }
            } else {
                RetrievalError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        debug!(url = url, bytes = body.len(), "Fetched upstream");
        Ok(body)
    }
}

/// Parse and check an upstream URL. Only `http` and `https` are fetched.
pub fn parse_upstream_url(url: &str) -> Result<Url, RetrievalError> {
    let parsed = Url::parse(url).map_err(|e| RetrievalError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(RetrievalError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn classify(url: &str, err: reqwest::Error) -> RetrievalError {
    if err.is_timeout() {
        RetrievalError::Timeout {
            url: url.to_string(),
        }
    } else if err.is_builder() {
        RetrievalError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        }
    } else {
        RetrievalError::Connection {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
