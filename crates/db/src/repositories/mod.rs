//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod financial_year;
pub mod upload;

pub use financial_year::{FinancialYearError, FinancialYearRepository, ResetOutcome};
pub use upload::{CreateUploadInput, UploadError, UploadRepository};
