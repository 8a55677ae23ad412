//! User Administration Handlers (admin only)

use axum::{extract::State, http::StatusCode, Json};

use super::profile::user_service;
use crate::application::dto::request::{CreateUserRequest, ListParams, UpdateRoleRequest};
use crate::application::dto::response::UserResponse;
use crate::application::services::UserService;
use crate::domain::Page;
use crate::presentation::http::extractors::{PathId, QueryParams, RequireAdmin, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// List users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Page<UserResponse>>, AppError> {
    let page = user_service(&state).list_users(params.into()).await?;
    Ok(Json(page.map(UserResponse::from)))
}

/// Create a user with a role
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(body): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = user_service(&state).create_user(body).await?;
    tracing::info!(admin_id = admin.user_id(), user_id = user.id, "User created by admin");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Change a user's role
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathId(user_id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service(&state)
        .update_role(admin.user_id(), user_id, body.role)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathId(user_id): PathId,
) -> Result<StatusCode, AppError> {
    user_service(&state)
        .delete_user(admin.user_id(), user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
