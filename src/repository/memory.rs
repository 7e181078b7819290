//! In-process repository guarded by a readers-writer lock

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::LibraryRepository;
use crate::{
    error::{AppError, AppResult},
    models::{Book, Loan},
};

/// Book records keyed by title
#[derive(Debug, Default)]
struct Inventory {
    books: HashMap<String, Book>,
}

impl Inventory {
    fn get_mut(&mut self, title: &str) -> AppResult<&mut Book> {
        self.books
            .get_mut(title)
            .ok_or_else(|| AppError::BookNotFound(title.to_string()))
    }
}

/// Active loans grouped by title, then looked up by borrower
#[derive(Debug, Default)]
struct LoanLedger {
    loans: HashMap<String, Vec<Loan>>,
}

impl LoanLedger {
    fn find(&self, borrower: &str, title: &str) -> Option<&Loan> {
        self.loans
            .get(title)?
            .iter()
            .find(|loan| loan.borrower == borrower)
    }

    fn find_mut(&mut self, borrower: &str, title: &str) -> Option<&mut Loan> {
        self.loans
            .get_mut(title)?
            .iter_mut()
            .find(|loan| loan.borrower == borrower)
    }

    fn insert(&mut self, loan: Loan) {
        self.loans.entry(loan.title.clone()).or_default().push(loan);
    }

    fn remove(&mut self, borrower: &str, title: &str) -> Option<Loan> {
        let loans = self.loans.get_mut(title)?;
        let index = loans.iter().position(|loan| loan.borrower == borrower)?;
        let loan = loans.swap_remove(index);
        if loans.is_empty() {
            self.loans.remove(title);
        }
        Some(loan)
    }
}

#[derive(Debug, Default)]
struct State {
    inventory: Inventory,
    ledger: LoanLedger,
}

/// Repository keeping books and loans in memory.
///
/// Cloning shares the same underlying state.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    state: Arc<RwLock<State>>,
}

impl MemoryRepository {
    /// Create a repository seeded with the given books
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let books = books
            .into_iter()
            .map(|book| (book.title.clone(), book))
            .collect();

        Self {
            state: Arc::new(RwLock::new(State {
                inventory: Inventory { books },
                ledger: LoanLedger::default(),
            })),
        }
    }
}

#[async_trait]
impl LibraryRepository for MemoryRepository {
    async fn get_book(&self, title: &str) -> AppResult<Book> {
        let state = self.state.read().await;
        state
            .inventory
            .books
            .get(title)
            .cloned()
            .ok_or_else(|| AppError::BookNotFound(title.to_string()))
    }

    async fn get_loan(&self, borrower: &str, title: &str) -> AppResult<Loan> {
        let state = self.state.read().await;
        state
            .ledger
            .find(borrower, title)
            .cloned()
            .ok_or_else(|| AppError::loan_not_found(borrower, title))
    }

    async fn borrow_book(&self, borrower: &str, title: &str, loan_period_days: i64) -> AppResult<Loan> {
        let mut guard = self.state.write().await;
        let State { inventory, ledger } = &mut *guard;

        let book = inventory.get_mut(title)?;
        if book.available_copies <= 0 {
            return Err(AppError::NoCopiesAvailable(title.to_string()));
        }
        if ledger.find(borrower, title).is_some() {
            return Err(AppError::duplicate_loan(borrower, title));
        }

        let loan = Loan::start(borrower, title, Utc::now(), loan_period_days)?;

        book.available_copies -= 1;
        ledger.insert(loan.clone());

        Ok(loan)
    }

    async fn extend_loan(&self, borrower: &str, title: &str, extension_days: i64) -> AppResult<Loan> {
        let mut state = self.state.write().await;
        let loan = state
            .ledger
            .find_mut(borrower, title)
            .ok_or_else(|| AppError::loan_not_found(borrower, title))?;

        loan.extend(extension_days)?;
        Ok(loan.clone())
    }

    async fn return_book(&self, borrower: &str, title: &str) -> AppResult<()> {
        let mut guard = self.state.write().await;
        let State { inventory, ledger } = &mut *guard;

        if ledger.find(borrower, title).is_none() {
            return Err(AppError::loan_not_found(borrower, title));
        }
        // Loans only exist for known titles
        let book = inventory.get_mut(title)?;

        ledger.remove(borrower, title);
        book.available_copies += 1;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
