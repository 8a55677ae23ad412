//! Upload Handlers
//!
//! Presigned single uploads and the two-phase bulk track upload.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::application::dto::request::{
    BulkAnalyzeRequest, BulkCommitRequest, PresignUploadRequest,
};
use crate::application::dto::{BulkAnalysisResponse, BulkCommitResponse, PresignedUploadResponse};
use crate::application::services::{BulkUploadService, BulkUploadServiceImpl};
use crate::infrastructure::repositories::{PgArtistRepository, PgTrackRepository};
use crate::presentation::http::extractors::{RequireEditor, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

fn bulk_service(state: &AppState) -> BulkUploadServiceImpl<PgTrackRepository, PgArtistRepository> {
    BulkUploadServiceImpl::new(
        Arc::new(PgTrackRepository::new(state.db.clone())),
        Arc::new(PgArtistRepository::new(state.db.clone())),
        state.uploads(),
        state.snowflake.clone(),
        &state.settings.uploads,
    )
}

/// Issue a presigned PUT for one image or audio file
pub async fn presign_upload(
    State(state): State<AppState>,
    _editor: RequireEditor,
    ValidatedJson(body): ValidatedJson<PresignUploadRequest>,
) -> Result<Json<PresignedUploadResponse>, AppError> {
    let presigned = state.uploads().presign(&body)?;
    Ok(Json(presigned))
}

/// Dry run: report what a bulk commit would do with each file
pub async fn analyze_bulk(
    State(state): State<AppState>,
    _editor: RequireEditor,
    ValidatedJson(body): ValidatedJson<BulkAnalyzeRequest>,
) -> Result<Json<BulkAnalysisResponse>, AppError> {
    let analysis = bulk_service(&state).analyze(body.files).await?;
    Ok(Json(analysis))
}

/// Create tracks for the confirmed files and presign their uploads
pub async fn commit_bulk(
    State(state): State<AppState>,
    _editor: RequireEditor,
    ValidatedJson(body): ValidatedJson<BulkCommitRequest>,
) -> Result<Json<BulkCommitResponse>, AppError> {
    let committed = bulk_service(&state).commit(body.files).await?;
    Ok(Json(committed))
}
