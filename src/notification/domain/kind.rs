//! Notification identifiers and categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new random notification identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category tag of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A task was assigned to the recipient.
    TaskAssigned,
    /// A task was completed.
    TaskCompleted,
    /// The recipient's completed task was approved.
    TaskApproved,
    /// The recipient's completed task was rejected.
    TaskRejected,
    /// The recipient's task passed its deadline.
    TaskOverdue,
    /// The recipient's task is due soon.
    DeadlineReminder,
    /// A building was created.
    NewBuildingCreated,
    /// A contractor joined a building.
    ContractorAssigned,
    /// Platform announcement.
    SystemUpdate,
    /// A contractor requests approval of completed work.
    ApprovalRequest,
    /// A contractor reported progress.
    ProgressUpdate,
}

impl NotificationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskAssigned => "task_assigned",
            Self::TaskCompleted => "task_completed",
            Self::TaskApproved => "task_approved",
            Self::TaskRejected => "task_rejected",
            Self::TaskOverdue => "task_overdue",
            Self::DeadlineReminder => "deadline_reminder",
            Self::NewBuildingCreated => "new_building_created",
            Self::ContractorAssigned => "contractor_assigned",
            Self::SystemUpdate => "system_update",
            Self::ApprovalRequest => "approval_request",
            Self::ProgressUpdate => "progress_update",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = ParseNotificationKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "task_assigned" => Ok(Self::TaskAssigned),
            "task_completed" => Ok(Self::TaskCompleted),
            "task_approved" => Ok(Self::TaskApproved),
            "task_rejected" => Ok(Self::TaskRejected),
            "task_overdue" => Ok(Self::TaskOverdue),
            "deadline_reminder" => Ok(Self::DeadlineReminder),
            "new_building_created" => Ok(Self::NewBuildingCreated),
            "contractor_assigned" => Ok(Self::ContractorAssigned),
            "system_update" => Ok(Self::SystemUpdate),
            "approval_request" => Ok(Self::ApprovalRequest),
            "progress_update" => Ok(Self::ProgressUpdate),
            _ => Err(ParseNotificationKindError(value.to_owned())),
        }
    }
}

/// Error returned while parsing notification kinds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notification kind: {0}")]
pub struct ParseNotificationKindError(pub String);
