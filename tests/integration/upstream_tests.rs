//! Tests against a live upstream served from a local listener.
//!
//! Tests verify:
//! - HttpFetcher pass-through is byte-identical
//! - Upstream timeouts and error statuses surface as 500s with a trace

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use thumb_proxy::transform::RasterProcessor;
use thumb_proxy::upstream::UpstreamFetcher;
use thumb_proxy::{create_router, HttpFetcher, ProxyConfig, RetrievalError, RouterConfig, ThumbProxy};

use super::test_utils::{create_test_png, image_dimensions};

/// Serve a small image site on an ephemeral port.
async fn spawn_upstream(png: Vec<u8>) -> SocketAddr {
    let slow_png = png.clone();
    let app = Router::new()
        .route(
            "/a.png",
            get(move || {
                let png = png.clone();
                async move { ([(header::CONTENT_TYPE, "image/png")], png) }
            }),
        )
        .route(
            "/slow.png",
            get(move || {
                let png = slow_png.clone();
                async move {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    png
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn proxy_router(timeout: Duration) -> Router {
    let fetcher = HttpFetcher::new(timeout).unwrap();
    let proxy = ThumbProxy::new(fetcher, RasterProcessor::default(), ProxyConfig::default());
    create_router(proxy, RouterConfig::default().with_tracing(false))
}

async fn get_body(router: Router, uri: &str) -> (StatusCode, bytes::Bytes) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn test_fetcher_returns_upstream_bytes() {
    let png = create_test_png(16, 16);
    let addr = spawn_upstream(png.clone()).await;
    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();

    let body = fetcher
        .fetch(&format!("http://{}/a.png", addr))
        .await
        .unwrap();

    assert_eq!(body.as_ref(), png.as_slice());
}

#[tokio::test]
async fn test_fetcher_maps_error_status() {
    let addr = spawn_upstream(create_test_png(4, 4)).await;
    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();

    let result = fetcher.fetch(&format!("http://{}/missing.png", addr)).await;

    assert!(matches!(
        result,
        Err(RetrievalError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_proxy_pass_through_over_http() {
    let png = create_test_png(32, 24);
    let addr = spawn_upstream(png.clone()).await;
    let router = proxy_router(Duration::from_secs(5));

    let (status, body) = get_body(router, &format!("/http://{}/a.png", addr)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), png.as_slice());
}

#[tokio::test]
async fn test_proxy_resize_over_http() {
    let addr = spawn_upstream(create_test_png(32, 24)).await;
    let router = proxy_router(Duration::from_secs(5));

    let (status, body) = get_body(router, &format!("/16x/http://{}/a.png", addr)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(image_dimensions(&body), (16, 12));
}

#[tokio::test]
async fn test_upstream_timeout_returns_500_with_trace() {
    let addr = spawn_upstream(create_test_png(4, 4)).await;
    let router = proxy_router(Duration::from_millis(200));

    let (status, body) = get_body(router, &format!("/http://{}/slow.png", addr)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body.to_vec()).unwrap();
    let (message, trace) = text.split_once("\n\n").unwrap();
    assert!(message.contains("timed out"), "message: {}", message);
    assert!(!trace.is_empty());
    assert!(trace.contains("stage: retrieve_upstream"));
}

#[tokio::test]
async fn test_upstream_404_returns_500() {
    let addr = spawn_upstream(create_test_png(4, 4)).await;
    let router = proxy_router(Duration::from_secs(5));

    let (status, body) = get_body(router, &format!("/http://{}/missing.png", addr)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("status 404"));
}

#[tokio::test]
async fn test_unreachable_upstream_returns_500() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let router = proxy_router(Duration::from_secs(2));
    let (status, body) = get_body(router, &format!("/http://{}/a.png", addr)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("stage: retrieve_upstream"));
}
