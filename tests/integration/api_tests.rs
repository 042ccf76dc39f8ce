//! API integration tests for proxied image retrieval and error handling.
//!
//! Tests verify:
//! - Pass-through and resized responses through the router
//! - Error cases (grammar miss, missing upstream, undecodable image)
//! - HTTP response codes and headers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
use http::HeaderValue;
use http_body_util::BodyExt;
use std::sync::atomic::Ordering;
use tower::ServiceExt;

use thumb_proxy::proxy::DEFAULT_CACHE_CONTROL;
use thumb_proxy::transform::RasterProcessor;
use thumb_proxy::{create_router, ProxyConfig, RouterConfig, ThumbProxy, ThumbUrl};

use super::test_utils::{
    create_test_jpeg, create_test_png, image_dimensions, is_valid_jpeg, is_valid_png, MockFetcher,
};

fn router_with(fetcher: MockFetcher, config: ProxyConfig) -> Router {
    let proxy = ThumbProxy::new(fetcher, RasterProcessor::default(), config);
    create_router(proxy, RouterConfig::default().with_tracing(false))
}

fn default_router(fetcher: MockFetcher) -> Router {
    router_with(fetcher, ProxyConfig::default())
}

async fn get(router: Router, uri: &str) -> (StatusCode, http::HeaderMap, bytes::Bytes) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

// =============================================================================
// Pass-through
// =============================================================================

#[tokio::test]
async fn test_pass_through_is_byte_identical() {
    let png = create_test_png(40, 30);
    let fetcher = MockFetcher::new().with_image("http://img.test/a.png", png.clone());
    let router = default_router(fetcher);

    let (status, headers, body) = get(router, "/http://img.test/a.png").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "image/png");
    assert_eq!(headers[CONTENT_LENGTH], png.len().to_string().as_str());
    assert_eq!(headers[CACHE_CONTROL], DEFAULT_CACHE_CONTROL);
    assert_eq!(body.as_ref(), png.as_slice());
}

#[tokio::test]
async fn test_pass_through_non_image_bytes() {
    let data = b"plain text, not pixels".to_vec();
    let fetcher = MockFetcher::new().with_image("http://img.test/readme.txt", data.clone());
    let router = default_router(fetcher);

    let (status, headers, body) = get(router, "/http://img.test/readme.txt").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "application/octet-stream");
    assert_eq!(body.as_ref(), data.as_slice());
}

#[tokio::test]
async fn test_escaped_upstream_url() {
    let png = create_test_png(40, 30);
    let fetcher = MockFetcher::new().with_image("http://img.test/a.png", png.clone());
    let router = default_router(fetcher);

    let (status, _, body) = get(router, "/http%3A%2F%2Fimg.test%2Fa.png").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), png.as_slice());
}

#[tokio::test]
async fn test_request_query_string_is_ignored() {
    let png = create_test_png(8, 8);
    let fetcher = MockFetcher::new().with_image("http://img.test/a.png", png.clone());
    let router = default_router(fetcher);

    let (status, _, body) = get(router, "/http://img.test/a.png?cache=bust").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), png.as_slice());
}

// =============================================================================
// Resizing
// =============================================================================

#[tokio::test]
async fn test_resize_width_only() {
    let fetcher =
        MockFetcher::new().with_image("http://img.test/wide.png", create_test_png(400, 100));
    let router = default_router(fetcher);

    let (status, headers, body) = get(router, "/200x/http://img.test/wide.png").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "image/png");
    assert_eq!(headers[CONTENT_LENGTH], body.len().to_string().as_str());
    assert!(is_valid_png(&body));
    assert_eq!(image_dimensions(&body), (200, 50));
}

#[tokio::test]
async fn test_resize_both_bounds_fits_inside() {
    for uri in [
        "/100x100/http://img.test/wide.png",
        "/100x100se/http://img.test/wide.png",
    ] {
        let fetcher =
            MockFetcher::new().with_image("http://img.test/wide.png", create_test_png(400, 100));
        let router = default_router(fetcher);

        let (status, _, body) = get(router, uri).await;

        assert_eq!(status, StatusCode::OK, "uri {}", uri);
        assert_eq!(image_dimensions(&body), (100, 25), "uri {}", uri);
    }
}

#[tokio::test]
async fn test_resize_jpeg() {
    let fetcher =
        MockFetcher::new().with_image("http://img.test/photo.jpg", create_test_jpeg(300, 200, 90));
    let router = default_router(fetcher);

    let (status, headers, body) = get(router, "/x100/http://img.test/photo.jpg").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "image/jpeg");
    assert!(is_valid_jpeg(&body));
    assert_eq!(image_dimensions(&body), (150, 100));
}

#[tokio::test]
async fn test_signed_path_with_gravity_segment() {
    let fetcher =
        MockFetcher::new().with_image("http://img.test/wide.png", create_test_png(400, 100));
    let router = router_with(fetcher, ProxyConfig::default().with_signatures_in_use(true));

    let (status, _, body) = get(router, "/abc1234567/200x/se/http://img.test/wide.png").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(image_dimensions(&body), (200, 50));
}

#[tokio::test]
async fn test_built_url_round_trip() {
    let fetcher =
        MockFetcher::new().with_image("http://img.test/wide.png", create_test_png(400, 100));
    let router = default_router(fetcher);

    let path = ThumbUrl::new("http://img.test/wide.png")
        .with_width(100)
        .path();
    let (status, _, body) = get(router, &path).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(image_dimensions(&body), (100, 25));
}

// =============================================================================
// Response Headers
// =============================================================================

#[tokio::test]
async fn test_configured_cache_header_wins() {
    let fetcher = MockFetcher::new().with_image("http://img.test/a.png", create_test_png(4, 4));
    let config =
        ProxyConfig::default().with_cache_header(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    let router = router_with(fetcher, config);

    let (status, headers, _) = get(router, "/http://img.test/a.png").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get_all(CACHE_CONTROL).iter().count(), 1);
    assert_eq!(headers[CACHE_CONTROL], "no-cache");
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_grammar_miss_returns_fixed_404() {
    for uri in ["/", "/thumbnail.png", "/200x/ftp://img.test/a.png"] {
        let fetcher = MockFetcher::new();
        let counter = fetcher.counter();
        let router = default_router(fetcher);

        let (status, headers, body) = get(router, uri).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "uri {}", uri);
        assert_eq!(headers[CONTENT_TYPE], "text/plain");
        assert_eq!(headers[CONTENT_LENGTH], "9");
        assert_eq!(body.as_ref(), b"Not Found");
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_missing_upstream_returns_500() {
    let fetcher = MockFetcher::new();
    let counter = fetcher.counter();
    let router = default_router(fetcher);

    let (status, _, body) = get(router, "/200x/http://img.test/gone.png").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.starts_with("Upstream http://img.test/gone.png responded with status 404"));
    assert!(text.contains("\n\nstage: retrieve_upstream"));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_undecodable_image_returns_500() {
    let fetcher =
        MockFetcher::new().with_image("http://img.test/broken.png", b"not an image".to_vec());
    let router = default_router(fetcher);

    let (status, _, body) = get(router, "/50x/http://img.test/broken.png").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("stage: transform_image"));
}

#[tokio::test]
async fn test_fetch_count_single_request() {
    let fetcher = MockFetcher::new().with_image("http://img.test/a.png", create_test_png(4, 4));
    let probe = fetcher.clone();
    let router = default_router(fetcher);

    let (status, _, _) = get(router, "/http://img.test/a.png").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(probe.fetch_count(), 1);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let router = default_router(MockFetcher::new());

    let (status, headers, body) = get(router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}
