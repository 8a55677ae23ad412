//! Common Test Utilities
//!
//! The router is built against a lazily connected pool that points at a
//! closed port, so every route runs for real up to its first query.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use catalog_admin::config::Settings;
use catalog_admin::infrastructure::database;
use catalog_admin::startup::{build_router, AppState};

/// Test application
pub struct TestApp {
    pub router: Router,
    pub settings: Settings,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(Settings::for_tests())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let pool = database::create_lazy_pool(&settings.database).expect("lazy pool");
        let state = AppState::new(pool, settings.clone()).expect("app state");
        Self {
            router: build_router(state),
            settings,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Make a GET request carrying a session cookie
    pub async fn get_with_session(&self, uri: &str, token: &str) -> Response {
        self.send(
            Request::get(uri)
                .header(
                    header::COOKIE,
                    format!("{}={}", self.settings.session.cookie_name, token),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, uri: &str, body: &Value) -> Response {
        self.post_raw(uri, &body.to_string(), "203.0.113.1").await
    }

    /// POST a raw body from a given client address
    pub async fn post_raw(&self, uri: &str, body: &str, client_ip: &str) -> Response {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .header("X-Forwarded-For", client_ip)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

/// Read a response body as JSON
pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as text
pub async fn text_body(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
