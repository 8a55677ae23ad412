//! Custom Extractors
//!
//! Axum extractors for authentication, role checks and request parsing.
//! Every rejection is an `AppError`, so clients always get the JSON error
//! body instead of axum's plain-text rejections.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::USER_AGENT, request::Parts},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::application::services::ClientInfo;
use crate::domain::UserRole;
use crate::presentation::middleware::{rate_limit::client_ip, AuthUser};
use crate::shared::error::AppError;
use crate::shared::snowflake::parse_id;
use crate::shared::validation::validate_request;
use crate::startup::AppState;

/// The session user, placed in the request by `auth_middleware`.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Not signed in".into()))
    }
}

fn require_role(auth: AuthUser, role: UserRole) -> Result<AuthUser, AppError> {
    if auth.user.role.allows(role) {
        Ok(auth)
    } else {
        Err(AppError::Forbidden(format!("Requires the {} role", role)))
    }
}

/// Session user with at least the editor role.
#[derive(Debug, Clone)]
pub struct RequireEditor(pub AuthUser);

impl<S> FromRequestParts<S> for RequireEditor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        require_role(auth, UserRole::Editor).map(Self)
    }
}

/// Session user with the admin role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        require_role(auth, UserRole::Admin).map(Self)
    }
}

/// A single snowflake ID path parameter.
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub i64);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest("Invalid ID".into()))?;
        parse_id(&raw)
            .map(Self)
            .ok_or_else(|| AppError::BadRequest("Invalid ID".into()))
    }
}

/// User agent and address recorded with new sessions.
impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip());
        Ok(ClientInfo {
            user_agent: parts
                .headers
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.chars().take(512).collect()),
            ip_address: client_ip(
                &parts.headers,
                peer,
                state.settings.rate_limit.trust_proxy_headers,
            )
            .map(|ip| ip.to_string()),
        })
    }
}

/// JSON body that passed its `validator` rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        validate_request(&value)?;
        Ok(Self(value))
    }
}

/// Query string parameters with a JSON error on malformed input.
#[derive(Debug, Clone)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    async fn echo_id(PathId(id): PathId) -> String {
        id.to_string()
    }

    #[tokio::test]
    async fn test_path_id_rejects_non_numeric() {
        let app = Router::new().route("/things/{id}", get(echo_id));

        let ok = app
            .clone()
            .oneshot(Request::builder().uri("/things/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        for bad in ["/things/abc", "/things/-1", "/things/0"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(bad).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{bad}");
        }
    }

    #[tokio::test]
    async fn test_missing_session_is_unauthorized() {
        async fn handler(_auth: AuthUser) -> &'static str {
            "secret"
        }
        let app = Router::new().route("/", get(handler));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
