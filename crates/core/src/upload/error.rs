//! Upload lifecycle errors.

use thiserror::Error;

use crate::upload::status::UploadStatus;

/// Errors raised by the upload state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadStateError {
    /// The batch is still being imported.
    #[error("Upload is still processing")]
    StillProcessing,

    /// The batch has already been rolled back.
    #[error("Upload has already been rolled back")]
    AlreadyRolledBack,

    /// The batch created no records.
    #[error("Upload has no transactions or payments to roll back")]
    NothingToRollBack,

    /// Any other disallowed move.
    #[error("Invalid upload status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: UploadStatus,
        /// Requested status.
        to: UploadStatus,
    },
}
