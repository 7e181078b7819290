//! Error types for the lending server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes returned in the response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    DbFailure = 3,
    NoSuchBook = 5,
    NoCopiesAvailable = 7,
    DuplicateLoan = 8,
    BadValue = 18,
    NoSuchLoan = 20,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("No copies available for {0}")]
    NoCopiesAvailable(String),

    #[error("{borrower} already has an active loan for {title}")]
    DuplicateLoan { borrower: String, title: String },

    #[error("No active loan of {title} for {borrower}")]
    LoanNotFound { borrower: String, title: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn loan_not_found(borrower: &str, title: &str) -> Self {
        AppError::LoanNotFound {
            borrower: borrower.to_string(),
            title: title.to_string(),
        }
    }

    pub fn duplicate_loan(borrower: &str, title: &str) -> Self {
        AppError::DuplicateLoan {
            borrower: borrower.to_string(),
            title: title.to_string(),
        }
    }

    /// HTTP status and body code for this error
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::BookNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchBook),
            AppError::LoanNotFound { .. } => (StatusCode::NOT_FOUND, ErrorCode::NoSuchLoan),
            AppError::NoCopiesAvailable(_) => (StatusCode::CONFLICT, ErrorCode::NoCopiesAvailable),
            AppError::DuplicateLoan { .. } => (StatusCode::CONFLICT, ErrorCode::DuplicateLoan),
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
