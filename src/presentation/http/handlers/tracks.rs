//! Track Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{
    CreateTrackRequest, ListParams, RegisterAudioRequest, SetTrackArtistsRequest,
    UpdateTrackRequest,
};
use crate::application::dto::response::{TrackArtistResponse, TrackDetailResponse, TrackResponse};
use crate::application::services::{TrackService, TrackServiceImpl};
use crate::domain::Page;
use crate::infrastructure::repositories::{PgArtistRepository, PgTrackRepository};
use crate::presentation::http::extractors::{PathId, QueryParams, RequireEditor, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn service(state: &AppState) -> TrackServiceImpl<PgTrackRepository, PgArtistRepository> {
    TrackServiceImpl::new(
        Arc::new(PgTrackRepository::new(state.db.clone())),
        Arc::new(PgArtistRepository::new(state.db.clone())),
        state.uploads(),
        state.snowflake.clone(),
    )
}

pub async fn list_tracks(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Page<TrackResponse>>, AppError> {
    let page = service(&state).list_tracks(params.into()).await?;
    Ok(Json(page.map(TrackResponse::from)))
}

/// Track with its credits
pub async fn get_track(
    State(state): State<AppState>,
    _auth: AuthUser,
    PathId(id): PathId,
) -> Result<Json<TrackDetailResponse>, AppError> {
    let detail = service(&state).get_track(id).await?;
    Ok(Json(detail.into()))
}

pub async fn get_track_by_slug(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<TrackDetailResponse>, AppError> {
    let detail = service(&state).get_track_by_slug(&slug).await?;
    Ok(Json(detail.into()))
}

pub async fn create_track(
    State(state): State<AppState>,
    _editor: RequireEditor,
    ValidatedJson(body): ValidatedJson<CreateTrackRequest>,
) -> Result<(StatusCode, Json<TrackResponse>), AppError> {
    let track = service(&state).create_track(body).await?;
    Ok((StatusCode::CREATED, Json(track.into())))
}

pub async fn update_track(
    State(state): State<AppState>,
    _editor: RequireEditor,
    PathId(id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateTrackRequest>,
) -> Result<Json<TrackResponse>, AppError> {
    let track = service(&state).update_track(id, body).await?;
    Ok(Json(track.into()))
}

pub async fn delete_track(
    State(state): State<AppState>,
    _editor: RequireEditor,
    PathId(id): PathId,
) -> Result<StatusCode, AppError> {
    service(&state).delete_track(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the artist credits
pub async fn set_artists(
    State(state): State<AppState>,
    _editor: RequireEditor,
    PathId(id): PathId,
    ValidatedJson(body): ValidatedJson<SetTrackArtistsRequest>,
) -> Result<Json<Vec<TrackArtistResponse>>, AppError> {
    let artists = service(&state).set_artists(id, body.artists).await?;
    Ok(Json(artists.into_iter().map(Into::into).collect()))
}

/// Attach audio the client uploaded with a presigned URL
pub async fn register_audio(
    State(state): State<AppState>,
    _editor: RequireEditor,
    PathId(id): PathId,
    ValidatedJson(body): ValidatedJson<RegisterAudioRequest>,
) -> Result<Json<TrackResponse>, AppError> {
    let track = service(&state).register_audio(id, body).await?;
    Ok(Json(track.into()))
}
