//! Upload batch routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use steward_core::{
    auth::UserRole,
    upload::{RollbackCounts, UploadStatus},
};
use steward_db::{UploadRepository, entities::upload_history, repositories::UploadError};
use tracing::info;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, response::ApiResult};

/// Creates the upload routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/uploads/{id}", get(get_upload))
        .route("/uploads/{id}/rollback", post(rollback_upload))
}

/// Response for an upload batch.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Upload ID.
    pub id: Uuid,
    /// Original file name.
    pub file_name: String,
    /// Lifecycle status.
    pub status: UploadStatus,
    /// User who uploaded the file.
    pub uploaded_by: Uuid,
    /// Upload time.
    pub uploaded_at: DateTime<FixedOffset>,
    /// User who rolled the batch back.
    pub rolled_back_by: Option<Uuid>,
    /// Rollback time.
    pub rolled_back_at: Option<DateTime<FixedOffset>>,
}

impl From<upload_history::Model> for UploadResponse {
    fn from(upload: upload_history::Model) -> Self {
        Self {
            id: upload.id,
            file_name: upload.file_name,
            status: upload.status.into(),
            uploaded_by: upload.uploaded_by,
            uploaded_at: upload.uploaded_at,
            rolled_back_by: upload.rolled_back_by,
            rolled_back_at: upload.rolled_back_at,
        }
    }
}

/// Response for a completed rollback.
#[derive(Debug, Serialize)]
pub struct RollbackResponse {
    /// The rolled back batch.
    pub upload_id: Uuid,
    /// Records deleted per table.
    pub deleted: RollbackCounts,
}

/// GET `/uploads/{id}` - Fetch an upload batch.
async fn get_upload(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UploadResponse>> {
    let repo = UploadRepository::new((*state.db).clone());
    let upload = repo.find_by_id(id).await?.ok_or(UploadError::NotFound(id))?;

    Ok(Json(upload.into()))
}

/// POST `/uploads/{id}/rollback` - Delete every record created by the batch.
async fn rollback_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RollbackResponse>> {
    auth.require(UserRole::can_rollback_uploads, "roll back uploads")?;

    let repo = UploadRepository::new((*state.db).clone());
    let deleted = repo.rollback(id, auth.user_id()).await?;

    info!(user_id = %auth.user_id(), upload_id = %id, "Upload rollback requested");
    Ok(Json(RollbackResponse {
        upload_id: id,
        deleted,
    }))
}
