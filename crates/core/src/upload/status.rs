//! Upload status state machine.

use serde::{Deserialize, Serialize};

use crate::upload::error::UploadStateError;

/// Status of an upload batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadStatus {
    /// Rows are still being written.
    Processing,
    /// All rows were written.
    Completed,
    /// The batch's rows were deleted. Terminal.
    RolledBack,
}

impl UploadStatus {
    /// Returns true if moving from `self` to `next` is a legal edge.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Processing, Self::Completed) | (Self::Completed, Self::RolledBack)
        )
    }

    /// Validates a move from `self` to `next`.
    ///
    /// # Errors
    ///
    /// Returns `UploadStateError::InvalidTransition` for any illegal edge.
    pub fn transition_to(self, next: Self) -> Result<Self, UploadStateError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(UploadStateError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "PROCESSING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::RolledBack => write!(f, "ROLLED_BACK"),
        }
    }
}

/// Checks that a batch in `status` holding the given record counts may be rolled back.
///
/// # Errors
///
/// - `StillProcessing` if the import has not finished
/// - `AlreadyRolledBack` if the batch was undone before
/// - `NothingToRollBack` if the batch created no records
pub fn ensure_rollback_allowed(
    status: UploadStatus,
    counts: RollbackCounts,
) -> Result<(), UploadStateError> {
    match status {
        UploadStatus::Processing => Err(UploadStateError::StillProcessing),
        UploadStatus::RolledBack => Err(UploadStateError::AlreadyRolledBack),
        UploadStatus::Completed if counts.is_empty() => Err(UploadStateError::NothingToRollBack),
        UploadStatus::Completed => Ok(()),
    }
}

/// Records attached to one upload batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackCounts {
    /// Transactions created by the batch.
    pub transactions: u64,
    /// Payments created by the batch.
    pub payments: u64,
}

impl RollbackCounts {
    /// Returns true if the batch holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.transactions == 0 && self.payments == 0
    }
}
