//! Integration tests for health, metrics and docs endpoints

mod common;

use axum::http::StatusCode;

#[tokio::test]
#[ignore = "requires database"]
async fn test_health_endpoint() {
    let app = common::TestApp::new().await;

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("healthy"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_liveness_endpoint() {
    let app = common::TestApp::new().await;

    let (status, body) = app.get("/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("alive"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_readiness_endpoint() {
    let app = common::TestApp::new().await;

    let (status, body) = app.get("/health/ready").await;

    assert_eq!(status, StatusCode::OK);
    let body = common::parse(&body);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"]["healthy"], true);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_docs_served() {
    let app = common::TestApp::new().await;

    let (status, page) = app.get("/api/docs/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("openapi.yml"));

    let (status, document) = app.get("/api/docs/openapi.yml").await;
    assert_eq!(status, StatusCode::OK);
    assert!(document.contains("/api/recipes/download_shopping_cart/"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_metrics_disabled_without_recorder() {
    let app = common::TestApp::new().await;

    let (status, _) = app.get("/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
