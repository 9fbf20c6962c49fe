//! `SeaORM` active enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored status of an upload batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UploadStatus {
    /// Rows are still being written.
    #[sea_orm(string_value = "PROCESSING")]
    Processing,
    /// All rows were written.
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// The batch's rows were deleted.
    #[sea_orm(string_value = "ROLLED_BACK")]
    RolledBack,
}

impl From<UploadStatus> for steward_core::upload::UploadStatus {
    fn from(status: UploadStatus) -> Self {
        match status {
            UploadStatus::Processing => Self::Processing,
            UploadStatus::Completed => Self::Completed,
            UploadStatus::RolledBack => Self::RolledBack,
        }
    }
}

impl From<steward_core::upload::UploadStatus> for UploadStatus {
    fn from(status: steward_core::upload::UploadStatus) -> Self {
        match status {
            steward_core::upload::UploadStatus::Processing => Self::Processing,
            steward_core::upload::UploadStatus::Completed => Self::Completed,
            steward_core::upload::UploadStatus::RolledBack => Self::RolledBack,
        }
    }
}
