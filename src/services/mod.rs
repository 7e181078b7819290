//! Business logic services

pub mod lending;

use std::sync::Arc;

use crate::repository::LibraryRepository;

pub use lending::{LendingPolicy, LendingService};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub lending: LendingService,
}

impl Services {
    /// Create all services on top of the given repository
    pub fn new(repository: Arc<dyn LibraryRepository>, policy: LendingPolicy) -> Self {
        Self {
            lending: LendingService::new(repository, policy),
        }
    }
}
