//! Catalog API Tests
//!
//! Without a database these cover routing and the auth gate.

use axum::http::StatusCode;
use test_case::test_case;

use crate::common::TestApp;

#[test_case("/api/artists" ; "artists")]
#[test_case("/api/groups/123" ; "group by id")]
#[test_case("/api/tracks/slug/intro" ; "track by slug")]
#[test_case("/api/releases" ; "releases")]
#[test_case("/api/banners" ; "banners")]
#[test_case("/api/images/artist/1" ; "gallery")]
#[test_case("/api/users" ; "users")]
#[test_case("/api/profile" ; "profile")]
#[tokio::test]
async fn test_protected_routes_require_session(uri: &str) {
    let app = TestApp::new();

    let response = app.get(uri).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_uploads_require_session() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/uploads/presign",
            &serde_json::json!({
                "kind": "image",
                "filename": "cover.jpg",
                "content_type": "image/jpeg",
                "size": 1024
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_active_banners_are_public() {
    let app = TestApp::new();

    // Past the auth gate, straight into the unreachable database
    let response = app.get("/api/banners/active").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let app = TestApp::new();

    let response = app.post_raw("/api/banners/active", "{}", "203.0.113.9").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
