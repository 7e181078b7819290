//! Request middleware: panic recovery and transaction logging

use std::any::Any;
use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// Largest request body buffered for logging
const MAX_LOGGED_BODY: usize = 1024 * 1024;

/// Turn a handler panic into a 500 JSON error
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(format!("Handler panicked: {}", detail)).into_response()
}

/// Log each API call as one `API_TRANSACTION` record with both payloads
pub async fn log_transaction(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let (parts, body) = request.into_parts();
    let request_payload = match to_bytes(body, MAX_LOGGED_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => return AppError::BadRequest(format!("Unreadable request body: {}", e)).into_response(),
    };

    let response = next
        .run(Request::from_parts(parts, Body::from(request_payload.clone())))
        .await;

    let (parts, body) = response.into_parts();
    let response_payload = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => return AppError::Internal(format!("Unreadable response body: {}", e)).into_response(),
    };

    tracing::info!(
        method = %method,
        path = %path,
        status = parts.status.as_u16(),
        duration = ?start.elapsed(),
        request_payload = %String::from_utf8_lossy(&request_payload),
        response_payload = %String::from_utf8_lossy(&response_payload),
        "API_TRANSACTION"
    );

    Response::from_parts(parts, Body::from(response_payload))
}
