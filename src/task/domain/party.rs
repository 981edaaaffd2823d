//! Users, roles and buildings as seen by the task workflow.
//!
//! These are read-only projections supplied by the user and building
//! directories; the workflow never creates or edits them.

use super::{BuildingId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role constraining which workflow operations a user may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Creates buildings and tasks, approves or rejects completed work.
    Builder,
    /// Performs assigned tasks.
    Contractor,
    /// Platform operator with read access to every audit trail.
    Admin,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Builder => "builder",
            Self::Contractor => "contractor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user acting on, or addressed by, the task workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    role: Role,
    full_name: String,
    email: String,
}

impl User {
    /// Creates a user projection.
    #[must_use]
    pub fn new(
        id: UserId,
        role: Role,
        full_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            role,
            full_name: full_name.into(),
            email: email.into(),
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the display name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Returns the e-mail address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// A building that owns tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    id: BuildingId,
    name: String,
    created_by: UserId,
    project_manager: Option<UserId>,
}

impl Building {
    /// Creates a building projection.
    #[must_use]
    pub fn new(id: BuildingId, name: impl Into<String>, created_by: UserId) -> Self {
        Self {
            id,
            name: name.into(),
            created_by,
            project_manager: None,
        }
    }

    /// Sets the project manager who receives approval requests.
    #[must_use]
    pub const fn with_project_manager(mut self, project_manager: UserId) -> Self {
        self.project_manager = Some(project_manager);
        self
    }

    /// Returns the building identifier.
    #[must_use]
    pub const fn id(&self) -> BuildingId {
        self.id
    }

    /// Returns the building name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the builder who created the building.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the project manager, if one is assigned.
    #[must_use]
    pub const fn project_manager(&self) -> Option<UserId> {
        self.project_manager
    }

    /// Returns the user who reviews completion requests: the project
    /// manager when assigned, otherwise the creator.
    #[must_use]
    pub fn approver(&self) -> UserId {
        self.project_manager.unwrap_or(self.created_by)
    }
}
