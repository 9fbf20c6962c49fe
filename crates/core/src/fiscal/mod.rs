//! Financial-year windows and reset confirmation.

pub mod reset;
pub mod window;

pub use reset::{ResetCounts, confirmation_matches, reset_confirmation_phrase};
pub use window::{FinancialYearWindow, WindowError};
