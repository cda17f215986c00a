//! Integration tests for health check endpoints

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_root_welcome() {
    let app = common::TestApp::new();

    let response = app.get("/", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Welcome to the Userbase API");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = common::TestApp::new();

    let response = app.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("healthy"));
}

#[tokio::test]
async fn test_liveness_endpoint() {
    let app = common::TestApp::new();

    let response = app.get("/health/live", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("alive"));
}

#[tokio::test]
async fn test_readiness_endpoint() {
    let app = common::TestApp::new();

    let response = app.get("/health/ready", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["checks"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_without_recorder_is_not_found() {
    let app = common::TestApp::new();

    let response = app.get("/metrics", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let app = common::TestApp::new();

    let response = app.get("/health", None).await;

    assert!(response.headers.contains_key("x-request-id"));
}
