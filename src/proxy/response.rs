//! Response assembly.
//!
//! Every proxied request ends in exactly one [`ProxyResponse`]:
//!
//! - `200` with the image bytes, a content type derived from the upstream
//!   URL's extension and the configured cache headers
//! - `404 Not Found` (plain text, 9 bytes) when the path does not match
//! - `401` when the signature hook rejects the request
//! - `500` with the failure message, a blank line and a diagnostic trace

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};

use crate::error::{AuthError, ProxyError};

/// Content type used when the extension is missing or unknown.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const NOT_FOUND_BODY: &str = "Not Found";

const MIME_TYPES: [(&str, &str); 4] = [
    (".png", "image/png"),
    (".gif", "image/gif"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
];

/// Status, headers and body of a proxy response.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ProxyResponse {
    /// Fixed response for paths outside the proxy grammar.
    pub fn not_found() -> Self {
        Self::plain_text(StatusCode::NOT_FOUND, Bytes::from_static(NOT_FOUND_BODY.as_bytes()))
    }

    /// Response for a rejected signature.
    pub fn unauthorized(err: &AuthError) -> Self {
        Self::plain_text(StatusCode::UNAUTHORIZED, Bytes::from(err.to_string()))
    }

    /// `500` carrying the failure message and its diagnostic trace.
    pub fn failure(err: &ProxyError) -> Self {
        let body = format!("{}\n\n{}", err, err.trace());
        Self::plain_text(StatusCode::INTERNAL_SERVER_ERROR, Bytes::from(body))
    }

    /// Successful image response. `cache_headers` are merged last and win
    /// over the defaults; every value of a multi-valued header is kept.
    pub fn image(upstream_url: &str, body: Bytes, cache_headers: &HeaderMap) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(content_type_for(upstream_url)),
        );
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

        for name in cache_headers.keys() {
            headers.remove(name);
        }
        for (name, value) in cache_headers {
            headers.append(name.clone(), value.clone());
        }

        Self {
            status: StatusCode::OK,
            headers,
            body,
        }
    }

    fn plain_text(status: StatusCode, body: Bytes) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Content type for an upstream URL, looked up by its case-sensitive file
/// extension. Anything else maps to [`DEFAULT_CONTENT_TYPE`].
pub fn content_type_for(url: &str) -> &'static str {
    let Some(extension) = file_extension(url) else {
        return DEFAULT_CONTENT_TYPE;
    };

    MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// Extension of the last path segment including the dot, e.g. `.png`.
///
/// Leading dots of a segment do not start an extension, and a trailing dot
/// yields none. Query strings are not stripped.
fn file_extension(url: &str) -> Option<&str> {
    let name = url.trim_end_matches('/').rsplit('/').next()?;
    let stem_start = name.len() - name.trim_start_matches('.').len();
    let dot = name[stem_start..].rfind('.')? + stem_start;

    let extension = &name[dot..];
    (extension.len() > 1).then_some(extension)
}
