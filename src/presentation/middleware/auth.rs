//! Authentication Middleware
//!
//! Session validation middleware for protected routes.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::application::services::{AuthService, AuthServiceImpl};
use crate::domain::{Session, User};
use crate::infrastructure::repositories::{PgSessionRepository, PgUserRepository};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated user extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub session: Session,
}

impl AuthUser {
    pub fn user_id(&self) -> i64 {
        self.user.id
    }
}

/// Session token from the session cookie, else from a `Bearer` header.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(cookie_name) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Build the auth service over the shared pool.
pub fn auth_service(state: &AppState) -> AuthServiceImpl<PgUserRepository, PgSessionRepository> {
    AuthServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        Arc::new(PgSessionRepository::new(state.db.clone())),
        state.snowflake.clone(),
        state.settings.session.ttl_hours,
    )
}

/// Authentication middleware that resolves the session token
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(request.headers(), &state.settings.session.cookie_name)
        .ok_or_else(|| AppError::Unauthorized("Not signed in".into()))?;

    let resolved = auth_service(&state).resolve_session(&token).await?;

    request.extensions_mut().insert(AuthUser {
        user: resolved.user,
        session: resolved.session,
    });

    Ok(next.run(request).await)
}
