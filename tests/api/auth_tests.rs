//! Authentication API Tests

use axum::http::{header, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use catalog_admin::config::Settings;

use crate::common::{json_body, TestApp};

#[tokio::test]
async fn test_login_with_empty_password_is_rejected() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/auth/login",
            &json!({ "identifier": "ada@example.com", "password": "" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_login_with_malformed_json_is_rejected() {
    let app = TestApp::new();

    let response = app
        .post_raw("/api/auth/login", "{not json", "203.0.113.2")
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_accepts_email_alias() {
    let app = TestApp::new();

    // Passes validation and reaches the (unreachable) database
    let response = app
        .post_raw(
            "/api/auth/login",
            &json!({ "email": "ada@example.com", "password": "hunter22" }).to_string(),
            "203.0.113.3",
        )
        .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_login_is_rate_limited_per_client_behind_proxy() {
    let mut settings = Settings::for_tests();
    settings.rate_limit.trust_proxy_headers = true;
    let app = TestApp::with_settings(settings);
    let limit = app.settings.rate_limit.login_attempts;
    let body = json!({ "identifier": "", "password": "" }).to_string();

    for _ in 0..limit {
        let response = app.post_raw("/api/auth/login", &body, "198.51.100.7").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app.post_raw("/api/auth/login", &body, "198.51.100.7").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));

    // Another client is unaffected
    let response = app.post_raw("/api/auth/login", &body, "198.51.100.8").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_reset_the_limit() {
    let app = TestApp::new();
    assert!(!app.settings.rate_limit.trust_proxy_headers);
    let limit = app.settings.rate_limit.login_attempts;
    let body = json!({ "identifier": "", "password": "" }).to_string();

    let mut statuses = Vec::new();
    for n in 0..limit * 3 {
        let spoofed = format!("192.0.2.{}", n + 1);
        let response = app.post_raw("/api/auth/login", &body, &spoofed).await;
        statuses.push(response.status());
    }

    let limited = statuses
        .iter()
        .filter(|s| **s == StatusCode::TOO_MANY_REQUESTS)
        .count();
    assert_eq!(limited, (limit * 2) as usize);
    assert!(statuses[..limit as usize]
        .iter()
        .all(|s| *s == StatusCode::BAD_REQUEST));
}

#[tokio::test]
async fn test_logout_without_session_is_idempotent() {
    let app = TestApp::new();

    let response = app.post_raw("/api/auth/logout", "", "203.0.113.4").await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_session_requires_sign_in() {
    let app = TestApp::new();

    let response = app.get("/api/auth/session").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Not signed in");
}

#[tokio::test]
async fn test_session_lookup_needs_the_database() {
    let app = TestApp::new();

    let response = app.get_with_session("/api/auth/session", "deadbeef").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
