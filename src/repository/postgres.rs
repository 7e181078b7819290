//! PostgreSQL repository: row locks and transactions keep inventory and loans consistent

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use sqlx::{Pool, Postgres};

use super::LibraryRepository;
use crate::{
    error::{AppError, AppResult},
    models::{Book, Loan},
};

#[derive(Clone)]
pub struct PostgresRepository {
    pool: Pool<Postgres>,
}

impl PostgresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LibraryRepository for PostgresRepository {
    async fn get_book(&self, title: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT title, available_copies FROM books WHERE title = $1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::BookNotFound(title.to_string()))
    }

    async fn get_loan(&self, borrower: &str, title: &str) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            "SELECT borrower, title, loan_date, return_date FROM loans WHERE borrower = $1 AND title = $2",
        )
        .bind(borrower)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::loan_not_found(borrower, title))
    }

    async fn borrow_book(&self, borrower: &str, title: &str, loan_period_days: i64) -> AppResult<Loan> {
        // TIMESTAMPTZ keeps microseconds
        let loan = Loan::start(borrower, title, Utc::now().trunc_subsecs(6), loan_period_days)?;

        // Dropping the transaction without commit rolls it back
        let mut tx = self.pool.begin().await?;

        // Lock the book row until commit so concurrent borrows serialize
        let available: i32 = sqlx::query_scalar(
            "SELECT available_copies FROM books WHERE title = $1 FOR UPDATE",
        )
        .bind(title)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::BookNotFound(title.to_string()))?;

        if available <= 0 {
            return Err(AppError::NoCopiesAvailable(title.to_string()));
        }

        let already_borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE borrower = $1 AND title = $2)",
        )
        .bind(borrower)
        .bind(title)
        .fetch_one(&mut *tx)
        .await?;

        if already_borrowed {
            return Err(AppError::duplicate_loan(borrower, title));
        }

        sqlx::query("UPDATE books SET available_copies = available_copies - 1 WHERE title = $1")
            .bind(title)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO loans (borrower, title, loan_date, return_date)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&loan.borrower)
        .bind(&loan.title)
        .bind(loan.loan_date)
        .bind(loan.return_date)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::duplicate_loan(borrower, title)
            }
            other => AppError::Database(other),
        })?;

        tx.commit().await?;

        Ok(loan)
    }

    async fn extend_loan(&self, borrower: &str, title: &str, extension_days: i64) -> AppResult<Loan> {
        let days = i32::try_from(extension_days)
            .map_err(|_| AppError::BadRequest(format!("Extension of {} days is out of range", extension_days)))?;

        sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET return_date = return_date + make_interval(days => $1)
            WHERE borrower = $2 AND title = $3
            RETURNING borrower, title, loan_date, return_date
            "#,
        )
        .bind(days)
        .bind(borrower)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::loan_not_found(borrower, title))
    }

    async fn return_book(&self, borrower: &str, title: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM loans WHERE borrower = $1 AND title = $2")
            .bind(borrower)
            .bind(title)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::loan_not_found(borrower, title));
        }

        sqlx::query("UPDATE books SET available_copies = available_copies + 1 WHERE title = $1")
            .bind(title)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
