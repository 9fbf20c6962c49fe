//! Upload history repository: batch registration, completion, and rollback.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use steward_core::upload::{
    RollbackCounts, UploadStateError, UploadStatus as DomainStatus, ensure_rollback_allowed,
};
use steward_shared::AppError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{payments, sea_orm_active_enums::UploadStatus, transactions, upload_history};

/// Error types for upload operations.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Upload batch not found.
    #[error("Upload not found: {0}")]
    NotFound(Uuid),

    /// The batch's lifecycle state forbids the operation.
    #[error(transparent)]
    State(#[from] UploadStateError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NotFound(id) => Self::NotFound(format!("Upload {id} not found")),
            UploadError::State(e) => Self::InvalidState(e.to_string()),
            UploadError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for registering an upload batch.
#[derive(Debug, Clone)]
pub struct CreateUploadInput {
    /// Original file name.
    pub file_name: String,
    /// User who uploaded the file.
    pub uploaded_by: Uuid,
}

/// Upload history repository.
#[derive(Debug, Clone)]
pub struct UploadRepository {
    db: DatabaseConnection,
}

impl UploadRepository {
    /// Creates a new upload repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a new batch in `PROCESSING`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(
        &self,
        input: CreateUploadInput,
    ) -> Result<upload_history::Model, UploadError> {
        let upload = upload_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            file_name: Set(input.file_name),
            status: Set(UploadStatus::Processing),
            uploaded_by: Set(input.uploaded_by),
            uploaded_at: Set(Utc::now().into()),
            rolled_back_by: Set(None),
            rolled_back_at: Set(None),
        }
        .insert(&self.db)
        .await?;

        Ok(upload)
    }

    /// Finds an upload batch by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<upload_history::Model>, UploadError> {
        let upload = upload_history::Entity::find_by_id(id).one(&self.db).await?;
        Ok(upload)
    }

    /// Marks a batch as fully imported.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `State` if the batch is not `PROCESSING`, or an
    /// error if the database operation fails.
    pub async fn mark_completed(&self, id: Uuid) -> Result<upload_history::Model, UploadError> {
        let txn = self.db.begin().await?;

        let upload = upload_history::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(UploadError::NotFound(id))?;

        let next = DomainStatus::from(upload.status).transition_to(DomainStatus::Completed)?;

        let mut active: upload_history::ActiveModel = upload.into();
        active.status = Set(next.into());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes every transaction and payment created by the batch and marks
    /// it `ROLLED_BACK`.
    ///
    /// Records are matched by batch reference only; manual entries and other
    /// batches are never touched, whatever their dates.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `State` (still processing, already rolled back, or
    /// nothing to roll back), or an error if the database operation fails.
    /// Nothing is deleted on any error.
    pub async fn rollback(
        &self,
        id: Uuid,
        rolled_back_by: Uuid,
    ) -> Result<RollbackCounts, UploadError> {
        let txn = self.db.begin().await?;

        let upload = upload_history::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(UploadError::NotFound(id))?;

        let attached = RollbackCounts {
            transactions: transactions::Entity::find()
                .filter(transactions::Column::UploadHistoryId.eq(id))
                .count(&txn)
                .await?,
            payments: payments::Entity::find()
                .filter(payments::Column::UploadHistoryId.eq(id))
                .count(&txn)
                .await?,
        };

        let status = DomainStatus::from(upload.status);
        if let Err(e) = ensure_rollback_allowed(status, attached) {
            warn!(upload_id = %id, %status, reason = %e, "Rollback rejected");
            return Err(e.into());
        }
        let next = status.transition_to(DomainStatus::RolledBack)?;

        let deleted = RollbackCounts {
            transactions: transactions::Entity::delete_many()
                .filter(transactions::Column::UploadHistoryId.eq(id))
                .exec(&txn)
                .await?
                .rows_affected,
            payments: payments::Entity::delete_many()
                .filter(payments::Column::UploadHistoryId.eq(id))
                .exec(&txn)
                .await?
                .rows_affected,
        };

        let mut active: upload_history::ActiveModel = upload.into();
        active.status = Set(next.into());
        active.rolled_back_by = Set(Some(rolled_back_by));
        active.rolled_back_at = Set(Some(Utc::now().into()));
        active.update(&txn).await?;

        txn.commit().await?;

        info!(
            upload_id = %id,
            transactions = deleted.transactions,
            payments = deleted.payments,
            "Upload rolled back"
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_errors_map_to_invalid_state() {
        let err: AppError = UploadError::from(UploadStateError::AlreadyRolledBack).into();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err: AppError = UploadError::NotFound(Uuid::new_v4()).into();
        assert_eq!(err.status_code(), 404);
    }
}
