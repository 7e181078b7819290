//! Loan model and related types

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Active loan of one book to one borrower
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    #[serde(rename = "name_of_borrower")]
    pub borrower: String,
    #[serde(rename = "book_title")]
    pub title: String,
    pub loan_date: DateTime<Utc>,
    /// Due date
    pub return_date: DateTime<Utc>,
}

/// `from` shifted by `days`, or an error when the date leaves chrono's range
fn shift_by_days(from: DateTime<Utc>, days: i64) -> AppResult<DateTime<Utc>> {
    TimeDelta::try_days(days)
        .and_then(|delta| from.checked_add_signed(delta))
        .ok_or_else(|| AppError::BadRequest(format!("Due date out of range: {} + {} days", from, days)))
}

impl Loan {
    /// Start a loan at `now`, due `loan_period_days` later
    pub fn start(borrower: &str, title: &str, now: DateTime<Utc>, loan_period_days: i64) -> AppResult<Self> {
        Ok(Self {
            borrower: borrower.to_string(),
            title: title.to_string(),
            loan_date: now,
            return_date: shift_by_days(now, loan_period_days)?,
        })
    }

    /// Push the due date back, relative to the current due date.
    ///
    /// The loan is left untouched on error.
    pub fn extend(&mut self, extension_days: i64) -> AppResult<()> {
        self.return_date = shift_by_days(self.return_date, extension_days)?;
        Ok(())
    }
}

/// Borrow / extend / return request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoanRequest {
    #[validate(length(min = 1, message = "name_of_borrower is required"))]
    pub name_of_borrower: String,
    #[validate(length(min = 1, message = "book_title is required"))]
    pub book_title: String,
}

/// Loan lookup query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    pub name_of_borrower: Option<String>,
    pub book_title: Option<String>,
}
