//! Data models for the lending server

pub mod book;
pub mod loan;

// Re-export commonly used types
pub use book::Book;
pub use loan::{Loan, LoanRequest};
