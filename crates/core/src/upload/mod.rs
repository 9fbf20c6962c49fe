//! Import batch lifecycle.
//!
//! An upload batch moves `PROCESSING -> COMPLETED -> ROLLED_BACK`.
//! `ROLLED_BACK` is terminal.

pub mod error;
pub mod status;

pub use error::UploadStateError;
pub use status::{RollbackCounts, UploadStatus, ensure_rollback_allowed};
