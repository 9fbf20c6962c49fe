//! Entity re-exports.

pub use super::financial_years::Entity as FinancialYears;
pub use super::payments::Entity as Payments;
pub use super::transactions::Entity as Transactions;
pub use super::upload_history::Entity as UploadHistory;
