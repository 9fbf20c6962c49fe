//! Error to JSON response mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use steward_db::repositories::{FinancialYearError, UploadError};
use steward_shared::AppError;
use tracing::error;

/// Handler error rendered as `{"error": <code>, "message": <text>}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Caller-facing message. Store failures are replaced by a generic text.
    fn message(&self) -> String {
        match &self.0 {
            AppError::Unauthenticated(failure) => failure.to_string(),
            AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidState(msg)
            | AppError::OriginRejected(msg)
            | AppError::Validation(msg) => msg.clone(),
            AppError::ConfirmationMismatch { expected } => {
                format!("Type \"{expected}\" to confirm the reset")
            }
            AppError::Database(_) | AppError::Internal(_) => "An error occurred".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_internal() {
            error!(error = %self.0, "Request failed");
        }

        let mut body = json!({
            "error": self.0.error_code(),
            "message": self.message(),
        });
        if let AppError::ConfirmationMismatch { expected } = &self.0 {
            body["expected"] = json!(expected);
        }

        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<FinancialYearError> for ApiError {
    fn from(err: FinancialYearError) -> Self {
        Self(err.into())
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        Self(err.into())
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
