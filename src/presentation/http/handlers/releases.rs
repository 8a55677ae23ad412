//! Release Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{
    CreateReleaseRequest, ListParams, SetReleaseArtistsRequest, SetReleaseTracksRequest,
    UpdateReleaseRequest,
};
use crate::application::dto::response::{
    ArtistRefResponse, ReleaseDetailResponse, ReleaseResponse, ReleaseTrackResponse,
};
use crate::application::services::{ReleaseService, ReleaseServiceImpl};
use crate::domain::Page;
use crate::infrastructure::repositories::{
    PgArtistRepository, PgImageRepository, PgReleaseRepository, PgTrackRepository,
};
use crate::presentation::http::extractors::{PathId, QueryParams, RequireEditor, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

type Service = ReleaseServiceImpl<
    PgReleaseRepository,
    PgTrackRepository,
    PgArtistRepository,
    PgImageRepository,
>;

fn service(state: &AppState) -> Service {
    ReleaseServiceImpl::new(
        Arc::new(PgReleaseRepository::new(state.db.clone())),
        Arc::new(PgTrackRepository::new(state.db.clone())),
        Arc::new(PgArtistRepository::new(state.db.clone())),
        Arc::new(PgImageRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

pub async fn list_releases(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Page<ReleaseResponse>>, AppError> {
    let page = service(&state).list_releases(params.into()).await?;
    Ok(Json(page.map(ReleaseResponse::from)))
}

/// Release with artists, tracklist and images
pub async fn get_release(
    State(state): State<AppState>,
    _auth: AuthUser,
    PathId(id): PathId,
) -> Result<Json<ReleaseDetailResponse>, AppError> {
    let detail = service(&state).get_release(id).await?;
    Ok(Json(detail.into()))
}

pub async fn get_release_by_slug(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ReleaseDetailResponse>, AppError> {
    let detail = service(&state).get_release_by_slug(&slug).await?;
    Ok(Json(detail.into()))
}

pub async fn create_release(
    State(state): State<AppState>,
    _editor: RequireEditor,
    ValidatedJson(body): ValidatedJson<CreateReleaseRequest>,
) -> Result<(StatusCode, Json<ReleaseResponse>), AppError> {
    let release = service(&state).create_release(body).await?;
    Ok((StatusCode::CREATED, Json(release.into())))
}

pub async fn update_release(
    State(state): State<AppState>,
    _editor: RequireEditor,
    PathId(id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateReleaseRequest>,
) -> Result<Json<ReleaseResponse>, AppError> {
    let release = service(&state).update_release(id, body).await?;
    Ok(Json(release.into()))
}

pub async fn delete_release(
    State(state): State<AppState>,
    _editor: RequireEditor,
    PathId(id): PathId,
) -> Result<StatusCode, AppError> {
    service(&state).delete_release(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the tracklist
pub async fn set_tracks(
    State(state): State<AppState>,
    _editor: RequireEditor,
    PathId(id): PathId,
    ValidatedJson(body): ValidatedJson<SetReleaseTracksRequest>,
) -> Result<Json<Vec<ReleaseTrackResponse>>, AppError> {
    let tracks = service(&state).set_tracks(id, body.tracks).await?;
    Ok(Json(tracks.into_iter().map(Into::into).collect()))
}

/// Replace the release artists
pub async fn set_artists(
    State(state): State<AppState>,
    _editor: RequireEditor,
    PathId(id): PathId,
    ValidatedJson(body): ValidatedJson<SetReleaseArtistsRequest>,
) -> Result<Json<Vec<ArtistRefResponse>>, AppError> {
    let artists = service(&state).set_artists(id, body.artist_ids).await?;
    Ok(Json(artists.into_iter().map(Into::into).collect()))
}
