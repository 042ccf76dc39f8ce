//! Upstream retrieval and the request-scoped working image.

mod fetcher;
mod working;

pub use fetcher::{
    parse_upstream_url, HttpFetcher, UpstreamFetcher, DEFAULT_UPSTREAM_TIMEOUT, USER_AGENT,
};
pub use working::WorkingImage;
