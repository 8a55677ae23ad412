//! Image Gallery Handlers
//!
//! Galleries are addressed as `/api/images/{owner}/{owner_id}` where owner is
//! one of `artist`, `group`, `release` or `profile`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{RegisterImageRequest, ReorderImagesRequest};
use crate::application::dto::response::ImageResponse;
use crate::application::services::{Actor, ImageService, ImageServiceImpl};
use crate::domain::ImageOwner;
use crate::infrastructure::repositories::PgImageRepository;
use crate::presentation::http::extractors::{PathId, ValidatedJson};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::snowflake::parse_id;
use crate::startup::AppState;

fn service(state: &AppState) -> ImageServiceImpl<PgImageRepository> {
    ImageServiceImpl::new(
        Arc::new(PgImageRepository::new(state.db.clone())),
        state.uploads(),
        state.snowflake.clone(),
    )
}

fn actor(auth: &AuthUser) -> Actor {
    Actor {
        user_id: auth.user.id,
        role: auth.user.role,
    }
}

fn parse_owner((owner, owner_id): (String, String)) -> Result<(ImageOwner, i64), AppError> {
    let owner = ImageOwner::from_str(&owner)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown image owner: {}", owner)))?;
    let owner_id = parse_id(&owner_id).ok_or_else(|| AppError::BadRequest("Invalid ID".into()))?;
    Ok((owner, owner_id))
}

pub async fn list_images(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<(String, String)>,
) -> Result<Json<Vec<ImageResponse>>, AppError> {
    let (owner, owner_id) = parse_owner(path)?;
    let images = service(&state).list_images(owner, owner_id).await?;
    Ok(Json(images.into_iter().map(Into::into).collect()))
}

/// Register an uploaded image at the end of the gallery
pub async fn register_image(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<RegisterImageRequest>,
) -> Result<(StatusCode, Json<ImageResponse>), AppError> {
    let (owner, owner_id) = parse_owner(path)?;
    let image = service(&state)
        .register_image(actor(&auth), owner, owner_id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(image.into())))
}

pub async fn reorder_images(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<ReorderImagesRequest>,
) -> Result<Json<Vec<ImageResponse>>, AppError> {
    let (owner, owner_id) = parse_owner(path)?;
    let images = service(&state)
        .reorder_images(actor(&auth), owner, owner_id, body.image_ids)
        .await?;
    Ok(Json(images.into_iter().map(Into::into).collect()))
}

pub async fn delete_image(
    State(state): State<AppState>,
    auth: AuthUser,
    PathId(id): PathId,
) -> Result<StatusCode, AppError> {
    service(&state).delete_image(actor(&auth), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
