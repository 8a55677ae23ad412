//! Group Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{
    CreateGroupRequest, ListParams, SetGroupMembersRequest, UpdateGroupRequest,
};
use crate::application::dto::response::{GroupDetailResponse, GroupMemberResponse, GroupResponse};
use crate::application::services::{GroupService, GroupServiceImpl};
use crate::domain::Page;
use crate::infrastructure::repositories::{
    PgArtistRepository, PgGroupRepository, PgImageRepository,
};
use crate::presentation::http::extractors::{PathId, QueryParams, RequireEditor, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

type Service = GroupServiceImpl<PgGroupRepository, PgArtistRepository, PgImageRepository>;

fn service(state: &AppState) -> Service {
    GroupServiceImpl::new(
        Arc::new(PgGroupRepository::new(state.db.clone())),
        Arc::new(PgArtistRepository::new(state.db.clone())),
        Arc::new(PgImageRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

pub async fn list_groups(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Page<GroupResponse>>, AppError> {
    let page = service(&state).list_groups(params.into()).await?;
    Ok(Json(page.map(GroupResponse::from)))
}

/// Group with members and images
pub async fn get_group(
    State(state): State<AppState>,
    _auth: AuthUser,
    PathId(id): PathId,
) -> Result<Json<GroupDetailResponse>, AppError> {
    let detail = service(&state).get_group(id).await?;
    Ok(Json(detail.into()))
}

pub async fn get_group_by_slug(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<GroupDetailResponse>, AppError> {
    let detail = service(&state).get_group_by_slug(&slug).await?;
    Ok(Json(detail.into()))
}

pub async fn create_group(
    State(state): State<AppState>,
    _editor: RequireEditor,
    ValidatedJson(body): ValidatedJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), AppError> {
    let group = service(&state).create_group(body).await?;
    Ok((StatusCode::CREATED, Json(group.into())))
}

pub async fn update_group(
    State(state): State<AppState>,
    _editor: RequireEditor,
    PathId(id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateGroupRequest>,
) -> Result<Json<GroupResponse>, AppError> {
    let group = service(&state).update_group(id, body).await?;
    Ok(Json(group.into()))
}

pub async fn delete_group(
    State(state): State<AppState>,
    _editor: RequireEditor,
    PathId(id): PathId,
) -> Result<StatusCode, AppError> {
    service(&state).delete_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the member list
pub async fn set_members(
    State(state): State<AppState>,
    _editor: RequireEditor,
    PathId(id): PathId,
    ValidatedJson(body): ValidatedJson<SetGroupMembersRequest>,
) -> Result<Json<Vec<GroupMemberResponse>>, AppError> {
    let members = service(&state).set_members(id, body.members).await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}
