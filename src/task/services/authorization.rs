//! Role and ownership policy for task operations.

use crate::task::domain::{Building, Role, Task, User, UserId};
use std::fmt;
use thiserror::Error;

/// Operation an actor attempts on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskAction {
    /// Create a task in a building.
    Create,
    /// Record contractor progress.
    UpdateProgress,
    /// Request approval of finished work.
    MarkCompleted,
    /// Pause, resume or cancel work.
    UpdateStatus,
    /// Approve completed work.
    Approve,
    /// Send completed work back for rework.
    Reject,
    /// Remove a task.
    Delete,
    /// Change the dependency set.
    ReplaceDependencies,
    /// Append a manual audit entry.
    AddNote,
    /// Read the task and its audit trail.
    View,
}

impl TaskAction {
    /// Returns a short label for log fields and denial messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::UpdateProgress => "update_progress",
            Self::MarkCompleted => "mark_completed",
            Self::UpdateStatus => "update_status",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Delete => "delete",
            Self::ReplaceDependencies => "replace_dependencies",
            Self::AddNote => "add_note",
            Self::View => "view",
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Denied authorization decision.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("user {actor} may not {action}: {reason}")]
pub struct AuthorizationDenial {
    /// Attempted action.
    pub action: TaskAction,
    /// Acting user.
    pub actor: UserId,
    /// Human-readable explanation.
    pub reason: &'static str,
}

/// Decides whether `actor` may perform `action`.
///
/// `task` is `None` only for [`TaskAction::Create`]; contractor-scoped
/// actions are denied without one.
///
/// | Action | Allowed actor |
/// |---|---|
/// | create, approve, reject, delete, replace dependencies | builder who created the building |
/// | update progress, mark completed, update status | assigned contractor |
/// | add note | assigned contractor or building creator |
/// | view | assigned contractor, building creator or any admin |
///
/// # Errors
///
/// Returns [`AuthorizationDenial`] naming the rule the actor failed.
pub fn authorize(
    action: TaskAction,
    actor: &User,
    building: &Building,
    task: Option<&Task>,
) -> Result<(), AuthorizationDenial> {
    let owns_building = actor.role() == Role::Builder && building.created_by() == actor.id();
    let assigned = actor.role() == Role::Contractor
        && task.is_some_and(|current| current.contractor_id() == actor.id());

    let (allowed, reason) = match action {
        TaskAction::Create
        | TaskAction::Approve
        | TaskAction::Reject
        | TaskAction::Delete
        | TaskAction::ReplaceDependencies => (
            owns_building,
            "only the builder who created the building may do this",
        ),
        TaskAction::UpdateProgress | TaskAction::MarkCompleted | TaskAction::UpdateStatus => {
            (assigned, "only the assigned contractor may do this")
        }
        TaskAction::AddNote => (
            assigned || owns_building,
            "only the assigned contractor or the building's creator may add updates",
        ),
        TaskAction::View => (
            assigned || owns_building || actor.role() == Role::Admin,
            "access to this task is restricted",
        ),
    };

    if allowed {
        Ok(())
    } else {
        Err(AuthorizationDenial {
            action,
            actor: actor.id(),
            reason,
        })
    }
}
