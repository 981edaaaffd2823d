//! In-memory user and building directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Building, BuildingId, User, UserId},
    ports::{BuildingDirectory, DirectoryError, DirectoryResult, UserDirectory},
};

/// Thread-safe in-memory directory of users and buildings.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    users: HashMap<UserId, User>,
    buildings: HashMap<BuildingId, Building>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a user.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Lookup`] when the lock is poisoned.
    pub fn insert_user(&self, user: User) -> DirectoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.users.insert(user.id(), user);
        Ok(())
    }

    /// Registers or replaces a building.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Lookup`] when the lock is poisoned.
    pub fn insert_building(&self, building: Building) -> DirectoryResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.buildings.insert(building.id(), building);
        Ok(())
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> DirectoryError {
    DirectoryError::lookup(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_user(&self, id: UserId) -> DirectoryResult<Option<User>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.users.get(&id).cloned())
    }
}

#[async_trait]
impl BuildingDirectory for InMemoryDirectory {
    async fn find_building(&self, id: BuildingId) -> DirectoryResult<Option<Building>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.buildings.get(&id).cloned())
    }
}
