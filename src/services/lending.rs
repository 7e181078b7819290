//! Lending service: loan policy on top of the repository

use std::sync::Arc;

use crate::{
    config::LendingConfig,
    error::AppResult,
    models::{Book, Loan},
    repository::LibraryRepository,
};

/// Days from borrow to the initial due date
pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 28;

/// Days added to the current due date by each extension
pub const DEFAULT_EXTENSION_DAYS: i64 = 21;

/// Loan durations applied to borrower-facing operations.
///
/// Extensions are not capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LendingPolicy {
    pub loan_period_days: i64,
    pub extension_days: i64,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
            extension_days: DEFAULT_EXTENSION_DAYS,
        }
    }
}

impl From<&LendingConfig> for LendingPolicy {
    fn from(config: &LendingConfig) -> Self {
        Self {
            loan_period_days: config.loan_period_days,
            extension_days: config.extension_days,
        }
    }
}

#[derive(Clone)]
pub struct LendingService {
    repository: Arc<dyn LibraryRepository>,
    policy: LendingPolicy,
}

impl LendingService {
    pub fn new(repository: Arc<dyn LibraryRepository>, policy: LendingPolicy) -> Self {
        Self { repository, policy }
    }

    pub fn policy(&self) -> LendingPolicy {
        self.policy
    }

    /// Look up a book's availability
    pub async fn get_book(&self, title: &str) -> AppResult<Book> {
        self.repository.get_book(title).await
    }

    /// Get the active loan of a book for a borrower
    pub async fn get_loan(&self, borrower: &str, title: &str) -> AppResult<Loan> {
        self.repository.get_loan(borrower, title).await
    }

    /// Borrow a book for the standard loan period
    pub async fn borrow_book(&self, borrower: &str, title: &str) -> AppResult<Loan> {
        let loan = self
            .repository
            .borrow_book(borrower, title, self.policy.loan_period_days)
            .await?;

        tracing::info!(borrower, title, due = %loan.return_date, "Book borrowed");
        Ok(loan)
    }

    /// Extend an active loan by the standard extension
    pub async fn extend_loan(&self, borrower: &str, title: &str) -> AppResult<Loan> {
        let loan = self
            .repository
            .extend_loan(borrower, title, self.policy.extension_days)
            .await?;

        tracing::info!(borrower, title, due = %loan.return_date, "Loan extended");
        Ok(loan)
    }

    /// Return a borrowed book
    pub async fn return_book(&self, borrower: &str, title: &str) -> AppResult<()> {
        self.repository.return_book(borrower, title).await?;

        tracing::info!(borrower, title, "Book returned");
        Ok(())
    }

    /// Check the storage backend
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
