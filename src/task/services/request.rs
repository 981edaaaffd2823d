//! Request payloads accepted by the lifecycle service.

use crate::task::domain::{BuildingId, TaskId, UserId};
use chrono::NaiveDate;

/// Request payload for creating a task.
///
/// Task type and priority arrive as text and are parsed by the service so
/// callers receive a validation error for unknown values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) task_type: String,
    pub(crate) priority: String,
    pub(crate) building_id: BuildingId,
    pub(crate) contractor_id: UserId,
    pub(crate) start_date: NaiveDate,
    pub(crate) deadline: NaiveDate,
    pub(crate) estimated_duration_days: Option<u32>,
    pub(crate) dependencies: Vec<TaskId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields. Priority defaults to
    /// `MEDIUM`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        task_type: impl Into<String>,
        building_id: BuildingId,
        contractor_id: UserId,
        start_date: NaiveDate,
        deadline: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            task_type: task_type.into(),
            priority: "MEDIUM".to_owned(),
            building_id,
            contractor_id,
            start_date,
            deadline,
            estimated_duration_days: None,
            dependencies: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Sets the planned duration.
    #[must_use]
    pub const fn with_estimated_duration_days(mut self, days: u32) -> Self {
        self.estimated_duration_days = Some(days);
        self
    }

    /// Sets the dependency tasks.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = TaskId>) -> Self {
        self.dependencies = dependencies.into_iter().collect();
        self
    }
}

/// Request payload for a manual audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRequest {
    pub(crate) update_type: String,
    pub(crate) message: String,
    pub(crate) image_refs: Vec<String>,
}

impl NoteRequest {
    /// Creates a note of the given update type.
    #[must_use]
    pub fn new(update_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            update_type: update_type.into(),
            message: message.into(),
            image_refs: Vec::new(),
        }
    }

    /// Attaches references to previously uploaded images.
    #[must_use]
    pub fn with_image_refs(mut self, image_refs: impl IntoIterator<Item = String>) -> Self {
        self.image_refs = image_refs.into_iter().collect();
        self
    }
}
