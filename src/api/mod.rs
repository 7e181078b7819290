//! API handlers for the lending REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod middleware;
pub mod openapi;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::get_book))
        // Loans
        .route("/loans", get(loans::get_loan))
        .route("/loans/borrow", post(loans::borrow_book))
        .route("/loans/extend", post(loans::extend_loan))
        .route("/loans/return", post(loans::return_book))
        .with_state(state)
        // Panics become 500s before the transaction record is written
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(from_fn(middleware::log_transaction));

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
