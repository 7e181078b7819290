//! Book (inventory) model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Book record with its count of copies not currently on loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// Title, unique across the inventory
    pub title: String,
    pub available_copies: i32,
}

impl Book {
    pub fn new(title: impl Into<String>, available_copies: i32) -> Self {
        Self {
            title: title.into(),
            available_copies,
        }
    }
}

/// Book lookup query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Exact book title
    pub title: Option<String>,
}
