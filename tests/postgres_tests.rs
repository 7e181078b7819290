//! PostgreSQL backend tests
//!
//! Require a database reachable through DATABASE_URL.
//! Run with: cargo test --test postgres_tests -- --ignored --test-threads=1

use chrono::Duration;
use lending_server::{
    error::AppError,
    repository::{LibraryRepository, PostgresRepository},
};
use sqlx::{postgres::PgPoolOptions, Executor, Pool, Postgres};

const TITLE: &str = "Postgres Test Book";

/// Title whose return fails after the loan row is deleted
const FAILING_RETURN_TITLE: &str = "Postgres Failing Return Book";

/// Borrower whose loan insert fails after the copy is taken
const REJECTED_BORROWER: &str = "Rejected Borrower";

async fn repository(copies: i32) -> PostgresRepository {
    PostgresRepository::new(pool_with_book(TITLE, copies).await)
}

async fn pool_with_book(title: &str, copies: i32) -> Pool<Postgres> {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    sqlx::query("DELETE FROM loans WHERE title = $1")
        .bind(title)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        r#"
        INSERT INTO books (title, available_copies) VALUES ($1, $2)
        ON CONFLICT (title) DO UPDATE SET available_copies = EXCLUDED.available_copies
        "#,
    )
    .bind(title)
    .bind(copies)
    .execute(&pool)
    .await
    .unwrap();

    pool
}

/// Install triggers that make the second write of borrow and return fail
async fn install_failing_triggers(pool: &Pool<Postgres>) {
    pool.execute(
        r#"
        CREATE OR REPLACE FUNCTION reject_test_loan() RETURNS trigger AS $$
        BEGIN
            RAISE EXCEPTION 'loan insert rejected';
        END;
        $$ LANGUAGE plpgsql;

        DROP TRIGGER IF EXISTS reject_test_loan ON loans;
        CREATE TRIGGER reject_test_loan BEFORE INSERT ON loans
            FOR EACH ROW WHEN (NEW.borrower = 'Rejected Borrower')
            EXECUTE FUNCTION reject_test_loan();

        CREATE OR REPLACE FUNCTION reject_test_restock() RETURNS trigger AS $$
        BEGIN
            RAISE EXCEPTION 'restock rejected';
        END;
        $$ LANGUAGE plpgsql;

        DROP TRIGGER IF EXISTS reject_test_restock ON books;
        CREATE TRIGGER reject_test_restock BEFORE UPDATE ON books
            FOR EACH ROW WHEN (NEW.title = 'Postgres Failing Return Book'
                               AND NEW.available_copies > OLD.available_copies)
            EXECUTE FUNCTION reject_test_restock();
        "#,
    )
    .await
    .expect("Failed to install triggers");
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle() {
    let repo = repository(1).await;

    let loan = repo.borrow_book("Alice", TITLE, 28).await.unwrap();
    assert_eq!(repo.get_book(TITLE).await.unwrap().available_copies, 0);
    assert_eq!(repo.get_loan("Alice", TITLE).await.unwrap(), loan);

    let err = repo.borrow_book("Bob", TITLE, 28).await.unwrap_err();
    assert!(matches!(err, AppError::NoCopiesAvailable(_)));

    repo.extend_loan("Alice", TITLE, 21).await.unwrap();
    let extended = repo.extend_loan("Alice", TITLE, 21).await.unwrap();
    assert_eq!(extended.return_date - extended.loan_date, Duration::days(70));

    repo.return_book("Alice", TITLE).await.unwrap();
    assert_eq!(repo.get_book(TITLE).await.unwrap().available_copies, 1);

    let err = repo.return_book("Alice", TITLE).await.unwrap_err();
    assert!(matches!(err, AppError::LoanNotFound { .. }));
}

#[tokio::test]
#[ignore]
async fn test_duplicate_loan_rolls_back() {
    let repo = repository(3).await;

    repo.borrow_book("Alice", TITLE, 28).await.unwrap();
    let err = repo.borrow_book("Alice", TITLE, 28).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateLoan { .. }));
    assert_eq!(repo.get_book(TITLE).await.unwrap().available_copies, 2);

    repo.return_book("Alice", TITLE).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_unknown_title() {
    let repo = repository(1).await;

    let err = repo.borrow_book("Alice", "No Such Title", 28).await.unwrap_err();
    assert!(matches!(err, AppError::BookNotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_concurrent_borrows_of_last_copy() {
    let repo = repository(1).await;

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.borrow_book(&format!("Borrower {}", i), TITLE, 28).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(repo.get_book(TITLE).await.unwrap().available_copies, 0);
}

#[tokio::test]
#[ignore]
async fn test_failed_loan_insert_rolls_back_decrement() {
    let pool = pool_with_book(TITLE, 2).await;
    install_failing_triggers(&pool).await;
    let repo = PostgresRepository::new(pool);

    let err = repo.borrow_book(REJECTED_BORROWER, TITLE, 28).await.unwrap_err();
    assert!(matches!(err, AppError::Database(_)));
    assert_eq!(repo.get_book(TITLE).await.unwrap().available_copies, 2);
    assert!(repo.get_loan(REJECTED_BORROWER, TITLE).await.is_err());
}

#[tokio::test]
#[ignore]
async fn test_failed_restock_rolls_back_return() {
    let pool = pool_with_book(FAILING_RETURN_TITLE, 1).await;
    install_failing_triggers(&pool).await;
    let repo = PostgresRepository::new(pool);

    let loan = repo.borrow_book("Alice", FAILING_RETURN_TITLE, 28).await.unwrap();

    let err = repo.return_book("Alice", FAILING_RETURN_TITLE).await.unwrap_err();
    assert!(matches!(err, AppError::Database(_)));
    assert_eq!(repo.get_loan("Alice", FAILING_RETURN_TITLE).await.unwrap(), loan);
    assert_eq!(repo.get_book(FAILING_RETURN_TITLE).await.unwrap().available_copies, 0);
}

#[tokio::test]
#[ignore]
async fn test_extension_out_of_range() {
    let repo = repository(1).await;
    let loan = repo.borrow_book("Alice", TITLE, 28).await.unwrap();

    let err = repo.extend_loan("Alice", TITLE, i64::from(i32::MAX) + 1).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(repo.get_loan("Alice", TITLE).await.unwrap(), loan);
}
