//! Loan lifecycle endpoints: borrow, extend, return

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanQuery, LoanRequest},
};

/// Return confirmation
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub message: String,
}

/// Unwrap and validate a JSON loan request, rejecting it as a bad request
fn validated(payload: Result<Json<LoanRequest>, JsonRejection>) -> AppResult<LoanRequest> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(request)
}

/// Get the active loan of a book for a borrower
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(LoanQuery),
    responses(
        (status = 200, description = "Active loan", body = Loan),
        (status = 400, description = "Missing borrower or title"),
        (status = 404, description = "No active loan")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Loan>> {
    let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
    let (Some(borrower), Some(title)) = (non_empty(query.name_of_borrower), non_empty(query.book_title)) else {
        return Err(AppError::BadRequest(
            "name_of_borrower and book_title parameters are required".to_string(),
        ));
    };

    let loan = state.services.lending.get_loan(&borrower, &title).await?;
    Ok(Json(loan))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/loans/borrow",
    tag = "loans",
    request_body = LoanRequest,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "No copies available or loan already active")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    payload: Result<Json<LoanRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let request = validated(payload)?;

    let loan = state
        .services
        .lending
        .borrow_book(&request.name_of_borrower, &request.book_title)
        .await?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// Extend an active loan
#[utoipa::path(
    post,
    path = "/loans/extend",
    tag = "loans",
    request_body = LoanRequest,
    responses(
        (status = 200, description = "Loan extended", body = Loan),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "No active loan")
    )
)]
pub async fn extend_loan(
    State(state): State<crate::AppState>,
    payload: Result<Json<LoanRequest>, JsonRejection>,
) -> AppResult<Json<Loan>> {
    let request = validated(payload)?;

    let loan = state
        .services
        .lending
        .extend_loan(&request.name_of_borrower, &request.book_title)
        .await?;

    Ok(Json(loan))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/return",
    tag = "loans",
    request_body = LoanRequest,
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "No active loan")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    payload: Result<Json<LoanRequest>, JsonRejection>,
) -> AppResult<Json<ReturnResponse>> {
    let request = validated(payload)?;

    state
        .services
        .lending
        .return_book(&request.name_of_borrower, &request.book_title)
        .await?;

    Ok(Json(ReturnResponse {
        message: "book returned successfully".to_string(),
    }))
}
