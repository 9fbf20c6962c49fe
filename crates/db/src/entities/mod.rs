//! `SeaORM` entity definitions.

pub mod prelude;

pub mod financial_years;
pub mod payments;
pub mod sea_orm_active_enums;
pub mod transactions;
pub mod upload_history;
