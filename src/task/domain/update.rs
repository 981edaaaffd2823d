//! Append-only task audit entries.

use super::{ParseUpdateTypeError, Progress, TaskId, TaskUpdateId, UserId, status::normalize};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a task audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    /// Contractor reported progress.
    ProgressUpdate,
    /// Status changed through a lifecycle operation.
    StatusChange,
    /// Contractor asked for completion approval.
    CompletionRequest,
    /// A problem on site was reported.
    IssueReported,
    /// Photos were attached.
    ImageUpload,
    /// Hours worked were logged.
    TimeLog,
    /// An intermediate milestone was reached.
    MilestoneCompleted,
    /// Free-form note from the builder or an administrator.
    AdminNote,
}

impl UpdateType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProgressUpdate => "progress_update",
            Self::StatusChange => "status_change",
            Self::CompletionRequest => "completion_request",
            Self::IssueReported => "issue_reported",
            Self::ImageUpload => "image_upload",
            Self::TimeLog => "time_log",
            Self::MilestoneCompleted => "milestone_completed",
            Self::AdminNote => "admin_note",
        }
    }

    /// Returns `true` for types only written by lifecycle transitions.
    #[must_use]
    pub const fn is_lifecycle_only(self) -> bool {
        matches!(self, Self::StatusChange | Self::CompletionRequest)
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UpdateType {
    type Error = ParseUpdateTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match normalize(value).as_str() {
            "progress_update" => Ok(Self::ProgressUpdate),
            "status_change" => Ok(Self::StatusChange),
            "completion_request" => Ok(Self::CompletionRequest),
            "issue_reported" => Ok(Self::IssueReported),
            "image_upload" => Ok(Self::ImageUpload),
            "time_log" => Ok(Self::TimeLog),
            "milestone_completed" => Ok(Self::MilestoneCompleted),
            "admin_note" => Ok(Self::AdminNote),
            _ => Err(ParseUpdateTypeError(value.to_owned())),
        }
    }
}

/// Immutable audit entry attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    id: TaskUpdateId,
    task_id: TaskId,
    author: UserId,
    update_type: UpdateType,
    message: String,
    progress: Option<Progress>,
    image_refs: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TaskUpdate {
    /// Records a new audit entry stamped with the current clock time.
    #[must_use]
    pub fn record(
        task_id: TaskId,
        author: UserId,
        update_type: UpdateType,
        message: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: TaskUpdateId::new(),
            task_id,
            author,
            update_type,
            message: message.into(),
            progress: None,
            image_refs: Vec::new(),
            created_at: clock.utc(),
        }
    }

    /// Attaches a progress snapshot.
    #[must_use]
    pub const fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Attaches image references.
    #[must_use]
    pub fn with_image_refs(mut self, image_refs: impl IntoIterator<Item = String>) -> Self {
        self.image_refs = image_refs.into_iter().collect();
        self
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> TaskUpdateId {
        self.id
    }

    /// Returns the task this entry belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the user who authored the entry.
    #[must_use]
    pub const fn author(&self) -> UserId {
        self.author
    }

    /// Returns the entry category.
    #[must_use]
    pub const fn update_type(&self) -> UpdateType {
        self.update_type
    }

    /// Returns the entry message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the progress snapshot, if any.
    #[must_use]
    pub const fn progress(&self) -> Option<Progress> {
        self.progress
    }

    /// Returns attached image references.
    #[must_use]
    pub fn image_refs(&self) -> &[String] {
        &self.image_refs
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
