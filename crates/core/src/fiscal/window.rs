//! Financial-year boundary calculation.
//!
//! A financial year runs from December 1 through November 30 of the
//! following calendar year, both days inclusive.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Month in which every financial year starts.
pub const YEAR_START_MONTH: u32 = 12;

/// Day of `YEAR_START_MONTH` on which every financial year starts.
pub const YEAR_START_DAY: u32 = 1;

/// Errors from boundary calculation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// The window would fall outside the range chrono can represent.
    #[error("date {0} is outside the supported calendar range")]
    OutOfRange(NaiveDate),
}

/// The date window of one financial year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialYearWindow {
    /// Deterministic label, `"<start year>-<end year>"`.
    pub label: String,
    /// First day of the window.
    pub start_date: NaiveDate,
    /// Last day of the window (inclusive).
    pub end_date: NaiveDate,
}

impl FinancialYearWindow {
    /// Returns the window containing `date`.
    ///
    /// # Errors
    ///
    /// Returns `WindowError::OutOfRange` for dates at the very edge of the
    /// representable calendar.
    pub fn containing(date: NaiveDate) -> Result<Self, WindowError> {
        let start_year = if date.month() >= YEAR_START_MONTH {
            date.year()
        } else {
            date.year() - 1
        };
        let start = NaiveDate::from_ymd_opt(start_year, YEAR_START_MONTH, YEAR_START_DAY)
            .ok_or(WindowError::OutOfRange(date))?;

        Self::starting_on(start)
    }

    /// Returns the window that follows a year ending on `current_end`.
    ///
    /// The next window starts the day after `current_end` and spans one year.
    ///
    /// # Errors
    ///
    /// Returns `WindowError::OutOfRange` if the next window cannot be represented.
    pub fn following(current_end: NaiveDate) -> Result<Self, WindowError> {
        let start = current_end
            .succ_opt()
            .ok_or(WindowError::OutOfRange(current_end))?;

        Self::starting_on(start)
    }

    fn starting_on(start: NaiveDate) -> Result<Self, WindowError> {
        let end = start
            .checked_add_months(Months::new(12))
            .and_then(|d| d.pred_opt())
            .ok_or(WindowError::OutOfRange(start))?;

        Ok(Self {
            label: format!("{}-{}", start.year(), end.year()),
            start_date: start,
            end_date: end,
        })
    }

    /// Returns true if `date` falls within the window, bounds included.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}
