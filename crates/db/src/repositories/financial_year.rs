//! Financial year repository: current-year pointer, advancement, and reset.
//!
//! Every write to `is_current` goes through [`promote_to_current`], which
//! clears the flag on all rows and sets it on one row inside the caller's
//! transaction.

use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
    prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use steward_core::fiscal::{
    FinancialYearWindow, ResetCounts, WindowError, confirmation_matches,
    reset_confirmation_phrase,
};
use steward_shared::AppError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{financial_years, payments, transactions, upload_history};

/// Error types for financial year operations.
#[derive(Debug, thiserror::Error)]
pub enum FinancialYearError {
    /// Financial year not found.
    #[error("Financial year not found: {0}")]
    YearNotFound(Uuid),

    /// No year is flagged current, so there is nothing to advance from.
    #[error("No current financial year; resolve the current year first")]
    NoCurrentYear,

    /// Reset confirmation did not match.
    #[error("Confirmation does not match; expected \"{expected}\"")]
    ConfirmationMismatch {
        /// The phrase the caller must type.
        expected: String,
    },

    /// Boundary calculation failed.
    #[error(transparent)]
    Window(#[from] WindowError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<FinancialYearError> for AppError {
    fn from(err: FinancialYearError) -> Self {
        match err {
            FinancialYearError::YearNotFound(id) => {
                Self::NotFound(format!("Financial year {id} not found"))
            }
            FinancialYearError::NoCurrentYear => Self::InvalidState(err.to_string()),
            FinancialYearError::ConfirmationMismatch { expected } => {
                Self::ConfirmationMismatch { expected }
            }
            FinancialYearError::Window(e) => Self::Internal(e.to_string()),
            FinancialYearError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Result of a reset execution.
#[derive(Debug, Clone)]
pub struct ResetOutcome {
    /// The year whose window was cleared. The row itself is untouched.
    pub financial_year: financial_years::Model,
    /// Records deleted per table.
    pub deleted: ResetCounts,
}

/// Financial year repository.
#[derive(Debug, Clone)]
pub struct FinancialYearRepository {
    db: DatabaseConnection,
}

impl FinancialYearRepository {
    /// Creates a new financial year repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all financial years, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<financial_years::Model>, FinancialYearError> {
        let years = financial_years::Entity::find()
            .order_by_desc(financial_years::Column::StartDate)
            .all(&self.db)
            .await?;
        Ok(years)
    }

    /// Finds a financial year by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<financial_years::Model>, FinancialYearError> {
        let year = financial_years::Entity::find_by_id(id).one(&self.db).await?;
        Ok(year)
    }

    /// Returns the year flagged current, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_current(&self) -> Result<Option<financial_years::Model>, FinancialYearError> {
        let year = financial_years::Entity::find()
            .filter(financial_years::Column::IsCurrent.eq(true))
            .one(&self.db)
            .await?;
        Ok(year)
    }

    /// Returns the current year, creating and flagging the year containing
    /// `today` when no row is current.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_or_create_current(
        &self,
        today: NaiveDate,
    ) -> Result<financial_years::Model, FinancialYearError> {
        if let Some(current) = self.find_current().await? {
            return Ok(current);
        }

        let window = FinancialYearWindow::containing(today)?;
        self.promote_window(&window).await
    }

    /// Advances to the year following the current one.
    ///
    /// The current row is read and locked inside the promotion transaction,
    /// so a concurrent `set_current` cannot leave this call advancing from a
    /// stale year. When two requests race, the one that waits on the lock
    /// no longer finds its current row and returns `NoCurrentYear`.
    ///
    /// # Errors
    ///
    /// Returns `NoCurrentYear` if no year is current, or an error if the
    /// database operation fails.
    pub async fn start_next(&self) -> Result<financial_years::Model, FinancialYearError> {
        let (current, next) = match self.try_start_next().await {
            Err(FinancialYearError::Database(e)) if is_unique_violation(&e) => {
                warn!("Concurrent promotion detected, retrying");
                self.try_start_next().await?
            }
            other => other?,
        };

        info!(
            from = %current.label,
            to = %next.label,
            "Advanced to next financial year"
        );
        Ok(next)
    }

    async fn try_start_next(
        &self,
    ) -> Result<(financial_years::Model, financial_years::Model), FinancialYearError> {
        let txn = self.db.begin().await?;

        let current = financial_years::Entity::find()
            .filter(financial_years::Column::IsCurrent.eq(true))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(FinancialYearError::NoCurrentYear)?;

        let window = FinancialYearWindow::following(current.end_date)?;
        let year = find_or_create(&txn, &window).await?;
        let next = promote_to_current(&txn, year).await?;
        txn.commit().await?;

        Ok((current, next))
    }

    /// Flags an existing year as current, clearing every other row.
    ///
    /// # Errors
    ///
    /// Returns `YearNotFound` if the ID does not resolve, or an error if the
    /// database operation fails.
    pub async fn set_current(&self, id: Uuid) -> Result<financial_years::Model, FinancialYearError> {
        let result = self.try_set_current(id).await;

        let year = match result {
            Err(FinancialYearError::Database(e)) if is_unique_violation(&e) => {
                warn!(financial_year_id = %id, "Concurrent promotion detected, retrying");
                self.try_set_current(id).await?
            }
            other => other?,
        };

        info!(financial_year_id = %year.id, label = %year.label, "Financial year set as current");
        Ok(year)
    }

    async fn try_set_current(&self, id: Uuid) -> Result<financial_years::Model, FinancialYearError> {
        let txn = self.db.begin().await?;

        let year = financial_years::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(FinancialYearError::YearNotFound(id))?;

        let year = promote_to_current(&txn, year).await?;
        txn.commit().await?;

        Ok(year)
    }

    /// Inserts the row for `window` without flagging it current.
    ///
    /// If a row with the same label already exists, that row is returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(
        &self,
        window: &FinancialYearWindow,
    ) -> Result<financial_years::Model, FinancialYearError> {
        Ok(insert_or_fetch(&self.db, window).await?)
    }

    /// Finds or creates the row for `window` and flags it current.
    ///
    /// Label collisions are resolved inside the transaction. A unique
    /// violation that still escapes comes from the single-current index,
    /// meaning another request promoted a row first; the second attempt
    /// runs after it.
    async fn promote_window(
        &self,
        window: &FinancialYearWindow,
    ) -> Result<financial_years::Model, FinancialYearError> {
        match self.try_promote_window(window).await {
            Err(FinancialYearError::Database(e)) if is_unique_violation(&e) => {
                warn!(label = %window.label, "Concurrent promotion detected, retrying");
                self.try_promote_window(window).await
            }
            other => other,
        }
    }

    async fn try_promote_window(
        &self,
        window: &FinancialYearWindow,
    ) -> Result<financial_years::Model, FinancialYearError> {
        let txn = self.db.begin().await?;

        let year = find_or_create(&txn, window).await?;
        let year = promote_to_current(&txn, year).await?;
        txn.commit().await?;

        Ok(year)
    }

    /// Counts the records a reset of this year would delete.
    ///
    /// # Errors
    ///
    /// Returns `YearNotFound` if the ID does not resolve, or an error if the
    /// database query fails.
    pub async fn preview_reset(&self, id: Uuid) -> Result<ResetCounts, FinancialYearError> {
        let year = self
            .find_by_id(id)
            .await?
            .ok_or(FinancialYearError::YearNotFound(id))?;

        let (from, until) = upload_bounds(&year);

        let transactions = transactions::Entity::find()
            .filter(transactions::Column::TransactionDate.between(year.start_date, year.end_date))
            .count(&self.db)
            .await?;
        let payments = payments::Entity::find()
            .filter(payments::Column::PaymentDate.between(year.start_date, year.end_date))
            .count(&self.db)
            .await?;
        let uploads = upload_history::Entity::find()
            .filter(upload_history::Column::UploadedAt.gte(from))
            .filter(upload_history::Column::UploadedAt.lt(until))
            .count(&self.db)
            .await?;

        Ok(ResetCounts {
            transactions,
            payments,
            uploads,
        })
    }

    /// Deletes every transaction, payment and upload dated inside the year,
    /// provided `confirmation` equals the year's reset phrase.
    ///
    /// The financial year row and its `is_current` flag are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `YearNotFound`, `ConfirmationMismatch` (carrying the expected
    /// phrase), or an error if the database operation fails. Nothing is
    /// deleted on any error.
    pub async fn execute_reset(
        &self,
        id: Uuid,
        confirmation: &str,
    ) -> Result<ResetOutcome, FinancialYearError> {
        let year = self
            .find_by_id(id)
            .await?
            .ok_or(FinancialYearError::YearNotFound(id))?;

        let expected = reset_confirmation_phrase(&year.label);
        if !confirmation_matches(&expected, confirmation) {
            warn!(financial_year_id = %id, "Reset confirmation mismatch");
            return Err(FinancialYearError::ConfirmationMismatch { expected });
        }

        let (from, until) = upload_bounds(&year);
        let txn = self.db.begin().await?;

        let transactions = transactions::Entity::delete_many()
            .filter(transactions::Column::TransactionDate.between(year.start_date, year.end_date))
            .exec(&txn)
            .await?
            .rows_affected;
        let payments = payments::Entity::delete_many()
            .filter(payments::Column::PaymentDate.between(year.start_date, year.end_date))
            .exec(&txn)
            .await?
            .rows_affected;
        let uploads = upload_history::Entity::delete_many()
            .filter(upload_history::Column::UploadedAt.gte(from))
            .filter(upload_history::Column::UploadedAt.lt(until))
            .exec(&txn)
            .await?
            .rows_affected;

        txn.commit().await?;

        let deleted = ResetCounts {
            transactions,
            payments,
            uploads,
        };
        info!(
            financial_year_id = %year.id,
            label = %year.label,
            transactions,
            payments,
            uploads,
            "Financial year reset"
        );

        Ok(ResetOutcome {
            financial_year: year,
            deleted,
        })
    }
}

/// Returns the row labelled after `window`, inserting it when missing.
async fn find_or_create<C>(
    conn: &C,
    window: &FinancialYearWindow,
) -> Result<financial_years::Model, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let existing = financial_years::Entity::find()
        .filter(financial_years::Column::Label.eq(window.label.as_str()))
        .one(conn)
        .await?;

    match existing {
        Some(year) => Ok(year),
        None => insert_or_fetch(conn, window).await,
    }
}

/// Inserts the row for `window`, treating a duplicate label as "already
/// created" and re-fetching the winner.
///
/// The insert runs in a nested transaction (a savepoint when `conn` is
/// already a transaction) so the failed statement can be rolled back
/// without aborting the caller's work.
async fn insert_or_fetch<C>(
    conn: &C,
    window: &FinancialYearWindow,
) -> Result<financial_years::Model, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let scope = conn.begin().await?;
    let now = Utc::now().into();

    let inserted = financial_years::ActiveModel {
        id: Set(Uuid::new_v4()),
        label: Set(window.label.clone()),
        start_date: Set(window.start_date),
        end_date: Set(window.end_date),
        is_current: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&scope)
    .await;

    match inserted {
        Ok(year) => {
            scope.commit().await?;
            info!(label = %year.label, "Financial year created");
            Ok(year)
        }
        Err(e) if is_unique_violation(&e) => {
            scope.rollback().await?;
            warn!(label = %window.label, "Financial year already created, re-fetching");

            financial_years::Entity::find()
                .filter(financial_years::Column::Label.eq(window.label.as_str()))
                .one(conn)
                .await?
                .ok_or(e)
        }
        Err(e) => Err(e),
    }
}

/// Clears `is_current` on every row, then sets it on `year`.
///
/// Must run inside a transaction so no reader sees zero or two current rows.
async fn promote_to_current<C: ConnectionTrait>(
    conn: &C,
    year: financial_years::Model,
) -> Result<financial_years::Model, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();

    financial_years::Entity::update_many()
        .col_expr(financial_years::Column::IsCurrent, Expr::value(false))
        .col_expr(financial_years::Column::UpdatedAt, Expr::value(now))
        .filter(financial_years::Column::IsCurrent.eq(true))
        .exec(conn)
        .await?;

    let mut active: financial_years::ActiveModel = year.into();
    active.is_current = Set(true);
    active.updated_at = Set(now);
    active.update(conn).await
}

/// Half-open timestamp range `[start 00:00, day after end 00:00)` in UTC,
/// covering every instant of the year's inclusive date bounds.
fn upload_bounds(year: &financial_years::Model) -> (DateTimeWithTimeZone, DateTimeWithTimeZone) {
    let from = year.start_date.and_time(NaiveTime::MIN).and_utc().fixed_offset();
    let until = year
        .end_date
        .succ_opt()
        .unwrap_or(year.end_date)
        .and_time(NaiveTime::MIN)
        .and_utc()
        .fixed_offset();
    (from, until)
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
