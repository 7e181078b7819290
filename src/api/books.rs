//! Book availability endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery},
};

/// Look up a book and its available copies
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Book found", body = Book),
        (status = 400, description = "Missing title"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Book>> {
    let title = query
        .title
        .filter(|title| !title.is_empty())
        .ok_or_else(|| AppError::BadRequest("title parameter is required".to_string()))?;

    let book = state.services.lending.get_book(&title).await?;
    Ok(Json(book))
}
