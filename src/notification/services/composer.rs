//! Renders notification copy for workflow events.

use minijinja::{Environment, Value, context};
use thiserror::Error;

use crate::notification::domain::{NotificationKind, NotificationRequest};
use crate::task::domain::{Building, Task, User};

/// A notification template: fixed headline plus a `minijinja` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Template {
    name: &'static str,
    kind: NotificationKind,
    title: &'static str,
    body: &'static str,
}

const TASK_ASSIGNED: Template = Template {
    name: "task_assigned",
    kind: NotificationKind::TaskAssigned,
    title: "New Task Assigned",
    body: "You have been assigned a new task: {{ task }} for building {{ building }}. \
           Deadline: {{ deadline }}",
};

const APPROVAL_REQUEST: Template = Template {
    name: "approval_request",
    kind: NotificationKind::ApprovalRequest,
    title: "Task Completion Request",
    body: "Contractor {{ contractor }} has marked task '{{ task }}' as completed \
           and is requesting approval",
};

const TASK_APPROVED: Template = Template {
    name: "task_approved",
    kind: NotificationKind::TaskApproved,
    title: "Task Approved",
    body: "Your completed task '{{ task }}' has been approved by {{ reviewer }}",
};

const TASK_REJECTED: Template = Template {
    name: "task_rejected",
    kind: NotificationKind::TaskRejected,
    title: "Task Rejected",
    body: "Your completed task '{{ task }}' has been rejected. Reason: {{ reason }}",
};

const TASK_OVERDUE: Template = Template {
    name: "task_overdue",
    kind: NotificationKind::TaskOverdue,
    title: "Task Overdue",
    body: "Task '{{ task }}' for building {{ building }} is overdue by {{ days }} \
           day{{ 's' if days != 1 }}",
};

const DEADLINE_REMINDER: Template = Template {
    name: "deadline_reminder",
    kind: NotificationKind::DeadlineReminder,
    title: "Deadline Reminder",
    body: "Task '{{ task }}' is due in {{ days }} day(s). Please ensure timely completion.",
};

const URGENT_DEADLINE_REMINDER: Template = Template {
    name: "urgent_deadline_reminder",
    kind: NotificationKind::DeadlineReminder,
    title: "URGENT: Task Due Tomorrow",
    body: "Task '{{ task }}' for building {{ building }} is due tomorrow! \
           Please ensure completion.",
};

/// Error raised when a notification body cannot be rendered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render notification template '{template}': {reason}")]
pub struct NotificationTemplateError {
    /// Template name.
    pub template: &'static str,
    /// Renderer message.
    pub reason: String,
}

/// Builds notification requests for lifecycle and deadline events.
///
/// Every request is linked to the task and its building so recipients can
/// navigate to the context.
#[derive(Debug, Clone)]
pub struct NotificationComposer {
    environment: Environment<'static>,
}

impl Default for NotificationComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationComposer {
    /// Creates a composer with the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            environment: Environment::new(),
        }
    }

    /// Tells the contractor about a new assignment.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationTemplateError`] when rendering fails.
    pub fn task_assigned(
        &self,
        task: &Task,
        building: &Building,
    ) -> Result<NotificationRequest, NotificationTemplateError> {
        let body = self.render(
            TASK_ASSIGNED,
            context! {
                task => task.name(),
                building => building.name(),
                deadline => task.deadline().to_string(),
            },
        )?;
        Ok(build(TASK_ASSIGNED, task.contractor_id(), task, body).with_related_user(task.created_by()))
    }

    /// Asks the building's reviewer to approve completed work.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationTemplateError`] when rendering fails.
    pub fn approval_request(
        &self,
        task: &Task,
        building: &Building,
        contractor: &User,
    ) -> Result<NotificationRequest, NotificationTemplateError> {
        let body = self.render(
            APPROVAL_REQUEST,
            context! {
                contractor => contractor.full_name(),
                task => task.name(),
            },
        )?;
        Ok(build(APPROVAL_REQUEST, building.approver(), task, body)
            .with_related_user(contractor.id()))
    }

    /// Tells the contractor their work was approved.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationTemplateError`] when rendering fails.
    pub fn task_approved(
        &self,
        task: &Task,
        reviewer: &User,
    ) -> Result<NotificationRequest, NotificationTemplateError> {
        let body = self.render(
            TASK_APPROVED,
            context! {
                task => task.name(),
                reviewer => reviewer.full_name(),
            },
        )?;
        Ok(build(TASK_APPROVED, task.contractor_id(), task, body).with_related_user(reviewer.id()))
    }

    /// Tells the contractor their work was rejected, with the reason.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationTemplateError`] when rendering fails.
    pub fn task_rejected(
        &self,
        task: &Task,
        reviewer: &User,
    ) -> Result<NotificationRequest, NotificationTemplateError> {
        let body = self.render(
            TASK_REJECTED,
            context! {
                task => task.name(),
                reason => task.rejection_reason().unwrap_or_default(),
            },
        )?;
        Ok(build(TASK_REJECTED, task.contractor_id(), task, body).with_related_user(reviewer.id()))
    }

    /// Warns the contractor that the deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationTemplateError`] when rendering fails.
    pub fn task_overdue(
        &self,
        task: &Task,
        building: &Building,
        days_overdue: i64,
    ) -> Result<NotificationRequest, NotificationTemplateError> {
        let body = self.render(
            TASK_OVERDUE,
            context! {
                task => task.name(),
                building => building.name(),
                days => days_overdue,
            },
        )?;
        Ok(build(TASK_OVERDUE, task.contractor_id(), task, body))
    }

    /// Reminds the contractor that the deadline is near.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationTemplateError`] when rendering fails.
    pub fn deadline_reminder(
        &self,
        task: &Task,
        days_remaining: i64,
    ) -> Result<NotificationRequest, NotificationTemplateError> {
        let body = self.render(
            DEADLINE_REMINDER,
            context! {
                task => task.name(),
                days => days_remaining,
            },
        )?;
        Ok(build(DEADLINE_REMINDER, task.contractor_id(), task, body))
    }

    /// Urgently reminds the contractor that the task is due tomorrow.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationTemplateError`] when rendering fails.
    pub fn urgent_deadline_reminder(
        &self,
        task: &Task,
        building: &Building,
    ) -> Result<NotificationRequest, NotificationTemplateError> {
        let body = self.render(
            URGENT_DEADLINE_REMINDER,
            context! {
                task => task.name(),
                building => building.name(),
            },
        )?;
        Ok(build(URGENT_DEADLINE_REMINDER, task.contractor_id(), task, body))
    }

    fn render(&self, template: Template, context: Value) -> Result<String, NotificationTemplateError> {
        self.environment
            .render_str(template.body, context)
            .map_err(|error| NotificationTemplateError {
                template: template.name,
                reason: error.to_string(),
            })
    }
}

fn build(
    template: Template,
    recipient: crate::task::domain::UserId,
    task: &Task,
    body: String,
) -> NotificationRequest {
    NotificationRequest::new(recipient, template.kind, template.title, body)
        .with_building(task.building_id())
        .with_task(task.id())
}
