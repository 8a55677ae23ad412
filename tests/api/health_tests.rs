//! Health Check API Tests

use axum::http::{header, StatusCode};
use pretty_assertions::assert_eq;

use crate::common::{json_body, text_body, TestApp};

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json.get("version").is_some());
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new();

    let response = app.get("/health/live").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "alive");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = TestApp::new();

    let response = app.get("/health/ready").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    assert_eq!(json["database"], "unavailable");
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = TestApp::new();

    let response = app.get("/health").await;

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
    // Not production: no HSTS
    assert!(!headers.contains_key("strict-transport-security"));
}

#[tokio::test]
async fn test_metrics_exposes_http_counters() {
    let app = TestApp::new();
    app.get("/health").await;

    let response = app.get("/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let body = text_body(response).await;
    assert!(body.contains("path=\"/health\""));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new();

    let response = app.get("/nope").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
