//! Repository layer: inventory and loan ledger storage

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{Book, Loan},
};

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// Storage capability the lending service is written against.
///
/// Every mutating operation runs its checks and its writes as one atomic
/// unit: two concurrent borrows can never both take the last copy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryRepository: Send + Sync {
    /// Look up a book by title
    async fn get_book(&self, title: &str) -> AppResult<Book>;

    /// Look up the active loan of `title` held by `borrower`
    async fn get_loan(&self, borrower: &str, title: &str) -> AppResult<Loan>;

    /// Take one copy of `title` out for `loan_period_days`.
    ///
    /// Fails with `BookNotFound`, `NoCopiesAvailable` or `DuplicateLoan`,
    /// checked in that order.
    async fn borrow_book(&self, borrower: &str, title: &str, loan_period_days: i64) -> AppResult<Loan>;

    /// Add `extension_days` to the current due date of an active loan
    async fn extend_loan(&self, borrower: &str, title: &str, extension_days: i64) -> AppResult<Loan>;

    /// Close an active loan and put the copy back into the inventory
    async fn return_book(&self, borrower: &str, title: &str) -> AppResult<()>;

    /// Check that the backend is reachable
    async fn ping(&self) -> AppResult<()>;
}
