//! Profile Handlers
//!
//! The signed-in user's own account.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::request::{ChangePasswordRequest, UpdateProfileRequest};
use crate::application::dto::response::UserResponse;
use crate::application::services::{AuthService, UserService, UserServiceImpl};
use crate::infrastructure::repositories::PgUserRepository;
use crate::presentation::http::extractors::ValidatedJson;
use crate::presentation::middleware::{auth_service, AuthUser};
use crate::shared::error::AppError;
use crate::startup::AppState;

pub(super) fn user_service(state: &AppState) -> UserServiceImpl<PgUserRepository> {
    UserServiceImpl::new(
        Arc::new(PgUserRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

/// Get current user profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service(&state).get_user(auth.user_id()).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update current user profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service(&state)
        .update_profile(auth.user_id(), body)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Change password. Other sessions of the user are signed out.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    auth_service(&state)
        .change_password(
            auth.user_id(),
            auth.session.id,
            &body.current_password,
            &body.new_password,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
