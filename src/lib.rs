//! Lending Server
//!
//! A small REST JSON API for book availability and the loan lifecycle:
//! borrow, extend and return, backed by an in-memory store or PostgreSQL.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build the state around an already constructed repository
    pub fn new(config: AppConfig, repository: Arc<dyn repository::LibraryRepository>) -> Self {
        let policy = services::LendingPolicy::from(&config.lending);
        Self {
            config: Arc::new(config),
            services: Arc::new(services::Services::new(repository, policy)),
        }
    }
}
