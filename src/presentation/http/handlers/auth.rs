//! Authentication Handlers

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::application::dto::request::LoginRequest;
use crate::application::dto::response::{SessionResponse, UserResponse};
use crate::application::services::{AuthService, ClientInfo};
use crate::config::SessionSettings;
use crate::presentation::http::extractors::ValidatedJson;
use crate::presentation::middleware::{auth_service, session_token, AuthUser};
use crate::shared::error::AppError;
use crate::startup::AppState;

fn session_cookie(settings: &SessionSettings, token: String) -> Cookie<'static> {
    Cookie::build((settings.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.secure_cookie)
        .build()
}

/// Sign in with email or username
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let outcome = auth_service(&state)
        .login(&body.identifier, &body.password, client)
        .await?;

    let jar = jar.add(session_cookie(&state.settings.session, outcome.token.clone()));
    let response = SessionResponse {
        token: outcome.token,
        expires_at: outcome.session.expires_at.to_rfc3339(),
        user: UserResponse::from(outcome.user),
    };

    Ok((jar, Json(response)))
}

/// Sign out. Succeeds without a session too.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: axum::http::HeaderMap,
) -> Result<(CookieJar, StatusCode), AppError> {
    let cookie_name = state.settings.session.cookie_name.clone();
    if let Some(token) = session_token(&headers, &cookie_name) {
        auth_service(&state).logout(&token).await?;
    }

    let jar = jar.remove(Cookie::build((cookie_name, "")).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}

/// Current session user
pub async fn session(auth: AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(auth.user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_flags() {
        let settings = SessionSettings {
            cookie_name: "catalog_session".into(),
            ttl_hours: 24,
            secure_cookie: true,
        };
        let cookie = session_cookie(&settings, "abc".into()).to_string();
        assert!(cookie.starts_with("catalog_session=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Path=/"));
    }
}
