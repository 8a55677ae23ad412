//! Notification Banner Handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::request::{CreateBannerRequest, ListParams, UpdateBannerRequest};
use crate::application::dto::response::BannerResponse;
use crate::application::services::{BannerService, BannerServiceImpl};
use crate::domain::Page;
use crate::infrastructure::repositories::PgBannerRepository;
use crate::presentation::http::extractors::{
    PathId, QueryParams, RequireAdmin, RequireEditor, ValidatedJson,
};
use crate::shared::error::AppError;
use crate::startup::AppState;

fn service(state: &AppState) -> BannerServiceImpl<PgBannerRepository> {
    BannerServiceImpl::new(
        Arc::new(PgBannerRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

/// Banners visible right now (public)
pub async fn active_banners(
    State(state): State<AppState>,
) -> Result<Json<Vec<BannerResponse>>, AppError> {
    let banners = service(&state).active_banners().await?;
    Ok(Json(banners.into_iter().map(Into::into).collect()))
}

pub async fn list_banners(
    State(state): State<AppState>,
    _editor: RequireEditor,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Page<BannerResponse>>, AppError> {
    let page = service(&state).list_banners(params.into()).await?;
    Ok(Json(page.map(BannerResponse::from)))
}

pub async fn create_banner(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ValidatedJson(body): ValidatedJson<CreateBannerRequest>,
) -> Result<(StatusCode, Json<BannerResponse>), AppError> {
    let banner = service(&state).create_banner(body).await?;
    Ok((StatusCode::CREATED, Json(banner.into())))
}

pub async fn update_banner(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    PathId(id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateBannerRequest>,
) -> Result<Json<BannerResponse>, AppError> {
    let banner = service(&state).update_banner(id, body).await?;
    Ok(Json(banner.into()))
}

pub async fn delete_banner(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    PathId(id): PathId,
) -> Result<StatusCode, AppError> {
    service(&state).delete_banner(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
