//! Read-only lookups for users and buildings.

use crate::task::domain::{Building, BuildingId, User, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// User lookup contract.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by identifier.
    ///
    /// Returns `None` when the user does not exist.
    async fn find_user(&self, id: UserId) -> DirectoryResult<Option<User>>;
}

/// Building lookup contract.
#[async_trait]
pub trait BuildingDirectory: Send + Sync {
    /// Finds a building by identifier.
    ///
    /// Returns `None` when the building does not exist.
    async fn find_building(&self, id: BuildingId) -> DirectoryResult<Option<Building>>;
}

/// Errors returned by directory implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// Lookup backend failure.
    #[error("directory lookup failed: {0}")]
    Lookup(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a lookup backend error.
    pub fn lookup(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Lookup(Arc::new(err))
    }
}
