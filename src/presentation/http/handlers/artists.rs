//! Artist Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreateArtistRequest, ListParams, UpdateArtistRequest};
use crate::application::dto::response::{ArtistDetailResponse, ArtistResponse};
use crate::application::services::{ArtistService, ArtistServiceImpl};
use crate::domain::Page;
use crate::infrastructure::repositories::{
    PgArtistRepository, PgGroupRepository, PgImageRepository,
};
use crate::presentation::http::extractors::{PathId, QueryParams, RequireEditor, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

type Service = ArtistServiceImpl<PgArtistRepository, PgGroupRepository, PgImageRepository>;

fn service(state: &AppState) -> Service {
    ArtistServiceImpl::new(
        Arc::new(PgArtistRepository::new(state.db.clone())),
        Arc::new(PgGroupRepository::new(state.db.clone())),
        Arc::new(PgImageRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

pub async fn list_artists(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Page<ArtistResponse>>, AppError> {
    let page = service(&state).list_artists(params.into()).await?;
    Ok(Json(page.map(ArtistResponse::from)))
}

/// Artist with groups and images
pub async fn get_artist(
    State(state): State<AppState>,
    _auth: AuthUser,
    PathId(id): PathId,
) -> Result<Json<ArtistDetailResponse>, AppError> {
    let detail = service(&state).get_artist(id).await?;
    Ok(Json(detail.into()))
}

pub async fn get_artist_by_slug(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ArtistDetailResponse>, AppError> {
    let detail = service(&state).get_artist_by_slug(&slug).await?;
    Ok(Json(detail.into()))
}

pub async fn create_artist(
    State(state): State<AppState>,
    _editor: RequireEditor,
    ValidatedJson(body): ValidatedJson<CreateArtistRequest>,
) -> Result<(StatusCode, Json<ArtistResponse>), AppError> {
    let artist = service(&state).create_artist(body).await?;
    Ok((StatusCode::CREATED, Json(artist.into())))
}

pub async fn update_artist(
    State(state): State<AppState>,
    _editor: RequireEditor,
    PathId(id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateArtistRequest>,
) -> Result<Json<ArtistResponse>, AppError> {
    let artist = service(&state).update_artist(id, body).await?;
    Ok(Json(artist.into()))
}

pub async fn delete_artist(
    State(state): State<AppState>,
    _editor: RequireEditor,
    PathId(id): PathId,
) -> Result<StatusCode, AppError> {
    service(&state).delete_artist(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
