//! Notification requests and stored notification records.

use super::{NotificationId, NotificationKind};
use crate::task::domain::{BuildingId, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Request to create a notification, as produced by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// User receiving the notification.
    pub recipient: UserId,
    /// Short headline.
    pub title: String,
    /// Human-readable body.
    pub message: String,
    /// Notification category.
    pub kind: NotificationKind,
    /// Building the notification concerns.
    pub related_building: Option<BuildingId>,
    /// Task the notification concerns.
    pub related_task: Option<TaskId>,
    /// Other user involved in the event, such as the approver.
    pub related_user: Option<UserId>,
    /// Instant after which the sink may discard the notification.
    pub expires_at: Option<DateTime<Utc>>,
}

impl NotificationRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        recipient: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            title: title.into(),
            message: message.into(),
            kind,
            related_building: None,
            related_task: None,
            related_user: None,
            expires_at: None,
        }
    }

    /// Links the notification to a building.
    #[must_use]
    pub const fn with_building(mut self, building: BuildingId) -> Self {
        self.related_building = Some(building);
        self
    }

    /// Links the notification to a task.
    #[must_use]
    pub const fn with_task(mut self, task: TaskId) -> Self {
        self.related_task = Some(task);
        self
    }

    /// Links the notification to another user.
    #[must_use]
    pub const fn with_related_user(mut self, user: UserId) -> Self {
        self.related_user = Some(user);
        self
    }

    /// Sets the expiry instant.
    #[must_use]
    pub const fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// A notification held by a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    request: NotificationRequest,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification from a request.
    #[must_use]
    pub fn from_request(request: NotificationRequest, clock: &impl Clock) -> Self {
        Self {
            id: NotificationId::new(),
            request,
            read_at: None,
            created_at: clock.utc(),
        }
    }

    /// Returns the notification identifier.
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the recipient.
    #[must_use]
    pub const fn recipient(&self) -> UserId {
        self.request.recipient
    }

    /// Returns the category.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.request.kind
    }

    /// Returns the headline.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.request.title
    }

    /// Returns the body.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.request.message
    }

    /// Returns the related building.
    #[must_use]
    pub const fn related_building(&self) -> Option<BuildingId> {
        self.request.related_building
    }

    /// Returns the related task.
    #[must_use]
    pub const fn related_task(&self) -> Option<TaskId> {
        self.request.related_task
    }

    /// Returns the related user.
    #[must_use]
    pub const fn related_user(&self) -> Option<UserId> {
        self.request.related_user
    }

    /// Returns `true` once the recipient has read the notification.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// Returns when the notification was read.
    #[must_use]
    pub const fn read_at(&self) -> Option<DateTime<Utc>> {
        self.read_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the expiry instant, if any.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.request.expires_at
    }

    /// Returns `true` when the expiry instant lies before `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.request.expires_at.is_some_and(|expiry| expiry < now)
    }

    /// Marks the notification read. Reading twice keeps the first timestamp.
    pub fn mark_read(&mut self, clock: &impl Clock) {
        if self.read_at.is_none() {
            self.read_at = Some(clock.utc());
        }
    }
}
