//! Task aggregate root and its lifecycle transitions.

use super::{
    BuildingId, Priority, Progress, TaskDomainError, TaskId, TaskStatus, TaskType, UserId,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated inputs for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Task name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Trade category.
    pub task_type: TaskType,
    /// Urgency.
    pub priority: Priority,
    /// Owning building.
    pub building_id: BuildingId,
    /// Contractor performing the work.
    pub contractor_id: UserId,
    /// Builder creating the task.
    pub created_by: UserId,
    /// Planned start date.
    pub start_date: NaiveDate,
    /// Due date.
    pub deadline: NaiveDate,
    /// Planned duration in days.
    pub estimated_duration_days: Option<u32>,
    /// Tasks that must be completed or approved before this one starts.
    pub dependencies: Vec<TaskId>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: String,
    description: Option<String>,
    task_type: TaskType,
    status: TaskStatus,
    priority: Priority,
    progress: Progress,
    building_id: BuildingId,
    contractor_id: UserId,
    created_by: UserId,
    approved_by: Option<UserId>,
    dependencies: Vec<TaskId>,
    start_date: NaiveDate,
    deadline: NaiveDate,
    completion_date: Option<NaiveDate>,
    approval_date: Option<NaiveDate>,
    estimated_duration_days: Option<u32>,
    actual_duration_days: Option<u32>,
    rejection_reason: Option<String>,
    completion_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: u64,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted name.
    pub name: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted trade category.
    pub task_type: TaskType,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted progress.
    pub progress: Progress,
    /// Owning building.
    pub building_id: BuildingId,
    /// Assigned contractor.
    pub contractor_id: UserId,
    /// Creating builder.
    pub created_by: UserId,
    /// Reviewer of the latest completion request.
    pub approved_by: Option<UserId>,
    /// Dependency task identifiers.
    pub dependencies: Vec<TaskId>,
    /// Planned start date.
    pub start_date: NaiveDate,
    /// Due date.
    pub deadline: NaiveDate,
    /// First completion date.
    pub completion_date: Option<NaiveDate>,
    /// Date of the latest approval or rejection.
    pub approval_date: Option<NaiveDate>,
    /// Planned duration in days.
    pub estimated_duration_days: Option<u32>,
    /// Measured duration in days.
    pub actual_duration_days: Option<u32>,
    /// Reason given for the latest rejection.
    pub rejection_reason: Option<String>,
    /// Notes supplied with the completion request.
    pub completion_notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic-lock revision.
    pub revision: u64,
}

impl Task {
    /// Creates a new task in [`TaskStatus::Assigned`] with zero progress.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskName`] for a blank name and
    /// [`TaskDomainError::DeadlineBeforeStart`] when the deadline precedes the
    /// start date.
    pub fn new(draft: TaskDraft, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(TaskDomainError::EmptyTaskName);
        }
        if draft.deadline < draft.start_date {
            return Err(TaskDomainError::DeadlineBeforeStart {
                start_date: draft.start_date,
                deadline: draft.deadline,
            });
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            name: name.to_owned(),
            description: draft.description,
            task_type: draft.task_type,
            status: TaskStatus::Assigned,
            priority: draft.priority,
            progress: Progress::ZERO,
            building_id: draft.building_id,
            contractor_id: draft.contractor_id,
            created_by: draft.created_by,
            approved_by: None,
            dependencies: dedup_preserving_order(draft.dependencies),
            start_date: draft.start_date,
            deadline: draft.deadline,
            completion_date: None,
            approval_date: None,
            estimated_duration_days: draft.estimated_duration_days,
            actual_duration_days: None,
            rejection_reason: None,
            completion_notes: None,
            created_at: timestamp,
            updated_at: timestamp,
            revision: 0,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            description: data.description,
            task_type: data.task_type,
            status: data.status,
            priority: data.priority,
            progress: data.progress,
            building_id: data.building_id,
            contractor_id: data.contractor_id,
            created_by: data.created_by,
            approved_by: data.approved_by,
            dependencies: data.dependencies,
            start_date: data.start_date,
            deadline: data.deadline,
            completion_date: data.completion_date,
            approval_date: data.approval_date,
            estimated_duration_days: data.estimated_duration_days,
            actual_duration_days: data.actual_duration_days,
            rejection_reason: data.rejection_reason,
            completion_notes: data.completion_notes,
            created_at: data.created_at,
            updated_at: data.updated_at,
            revision: data.revision,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the trade category.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the completion percentage.
    #[must_use]
    pub const fn progress(&self) -> Progress {
        self.progress
    }

    /// Returns the owning building.
    #[must_use]
    pub const fn building_id(&self) -> BuildingId {
        self.building_id
    }

    /// Returns the assigned contractor.
    #[must_use]
    pub const fn contractor_id(&self) -> UserId {
        self.contractor_id
    }

    /// Returns the builder who created the task.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the reviewer of the latest completion request.
    #[must_use]
    pub const fn approved_by(&self) -> Option<UserId> {
        self.approved_by
    }

    /// Returns the dependency task identifiers, in insertion order.
    #[must_use]
    pub fn dependencies(&self) -> &[TaskId] {
        &self.dependencies
    }

    /// Returns the planned start date.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Returns the due date.
    #[must_use]
    pub const fn deadline(&self) -> NaiveDate {
        self.deadline
    }

    /// Returns the date the task was first marked complete.
    #[must_use]
    pub const fn completion_date(&self) -> Option<NaiveDate> {
        self.completion_date
    }

    /// Returns the date of the latest approval or rejection.
    #[must_use]
    pub const fn approval_date(&self) -> Option<NaiveDate> {
        self.approval_date
    }

    /// Returns the planned duration in days.
    #[must_use]
    pub const fn estimated_duration_days(&self) -> Option<u32> {
        self.estimated_duration_days
    }

    /// Returns the measured duration in days.
    #[must_use]
    pub const fn actual_duration_days(&self) -> Option<u32> {
        self.actual_duration_days
    }

    /// Returns the reason given for the latest rejection.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    /// Returns notes supplied with the completion request.
    #[must_use]
    pub fn completion_notes(&self) -> Option<&str> {
        self.completion_notes.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the optimistic-lock revision. Every mutation increments it by
    /// exactly one.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns `true` when the deadline has passed and the work is not done.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.deadline && !self.status.is_done()
    }

    /// Returns signed whole days from `today` until the deadline.
    #[must_use]
    pub fn days_until_deadline(&self, today: NaiveDate) -> i64 {
        (self.deadline - today).num_days()
    }

    /// Returns the number of days past the deadline, or zero when the task is
    /// not overdue.
    #[must_use]
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        if self.is_overdue(today) {
            (today - self.deadline).num_days()
        } else {
            0
        }
    }

    /// Records new progress. Positive progress on an assigned task starts it.
    ///
    /// Returns `true` when the call moved the task to
    /// [`TaskStatus::InProgress`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TerminalTask`] for approved or cancelled
    /// tasks.
    pub fn record_progress(
        &mut self,
        progress: Progress,
        clock: &impl Clock,
    ) -> Result<bool, TaskDomainError> {
        self.ensure_editable()?;
        let starts = !progress.is_zero() && self.status == TaskStatus::Assigned;
        if starts {
            self.status = TaskStatus::InProgress;
        }
        self.progress = progress;
        self.touch(clock);
        Ok(starts)
    }

    /// Applies a contractor-driven status change such as pausing, resuming
    /// or cancelling work.
    ///
    /// Resuming into [`TaskStatus::InProgress`] with no recorded progress
    /// sets progress to 10%.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ReservedStatus`] for statuses owned by the
    /// completion and review operations, and
    /// [`TaskDomainError::InvalidStateTransition`] when the lifecycle does not
    /// permit the move.
    pub fn change_status(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if matches!(
            target,
            TaskStatus::Assigned
                | TaskStatus::Completed
                | TaskStatus::Approved
                | TaskStatus::Rejected
        ) {
            return Err(TaskDomainError::ReservedStatus(target));
        }
        self.ensure_transition(target)?;

        self.status = target;
        if target == TaskStatus::InProgress && self.progress.is_zero() {
            self.progress = Progress::STARTED;
        }
        self.touch(clock);
        Ok(())
    }

    /// Marks the task complete and awaiting approval.
    ///
    /// Completion date and measured duration are recorded the first time the
    /// task is completed and kept across rework cycles.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// assigned or in progress.
    pub fn complete(
        &mut self,
        completion_notes: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !matches!(self.status, TaskStatus::Assigned | TaskStatus::InProgress) {
            return Err(self.invalid_transition(TaskStatus::Completed));
        }

        let today = clock.utc().date_naive();
        self.status = TaskStatus::Completed;
        self.progress = Progress::COMPLETE;
        if self.completion_date.is_none() {
            self.completion_date = Some(today);
            let elapsed = (today - self.start_date).num_days().max(0);
            self.actual_duration_days = Some(u32::try_from(elapsed).unwrap_or(u32::MAX));
        }
        if completion_notes.is_some() {
            self.completion_notes = completion_notes;
        }
        self.touch(clock);
        Ok(())
    }

    /// Approves a completed task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// completed.
    pub fn approve(&mut self, approver: UserId, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_transition(TaskStatus::Approved)?;
        self.status = TaskStatus::Approved;
        self.approved_by = Some(approver);
        self.approval_date = Some(clock.utc().date_naive());
        self.touch(clock);
        Ok(())
    }

    /// Rejects a completed task and sends it back for rework at 90%.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// completed, and [`TaskDomainError::EmptyRejectionReason`] for a blank
    /// reason.
    pub fn reject(
        &mut self,
        reviewer: UserId,
        reason: &str,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_transition(TaskStatus::Rejected)?;
        let trimmed = reason.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyRejectionReason);
        }

        self.status = TaskStatus::Rejected;
        self.approved_by = Some(reviewer);
        self.rejection_reason = Some(trimmed.to_owned());
        self.approval_date = Some(clock.utc().date_naive());
        self.progress = Progress::REWORK;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the dependency set, dropping duplicates.
    ///
    /// Acyclicity across tasks is checked by the caller with
    /// [`super::DependencyGraph`]; this method only rejects self-references.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TerminalTask`] for approved or cancelled
    /// tasks and [`TaskDomainError::SelfDependency`] when the set contains the
    /// task itself.
    pub fn replace_dependencies(
        &mut self,
        dependencies: Vec<TaskId>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_editable()?;
        if dependencies.contains(&self.id) {
            return Err(TaskDomainError::SelfDependency(self.id));
        }
        self.dependencies = dedup_preserving_order(dependencies);
        self.touch(clock);
        Ok(())
    }

    /// Checks that the task may be removed: it must be assigned, on hold or
    /// cancelled, with no recorded progress.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotDeletable`] otherwise.
    pub fn ensure_deletable(&self) -> Result<(), TaskDomainError> {
        let pre_progress = matches!(
            self.status,
            TaskStatus::Assigned | TaskStatus::OnHold | TaskStatus::Cancelled
        );
        if pre_progress && self.progress.is_zero() {
            return Ok(());
        }
        Err(TaskDomainError::NotDeletable {
            task_id: self.id,
            status: self.status,
        })
    }

    fn ensure_editable(&self) -> Result<(), TaskDomainError> {
        if self.status.is_terminal() {
            return Err(TaskDomainError::TerminalTask {
                task_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    fn ensure_transition(&self, target: TaskStatus) -> Result<(), TaskDomainError> {
        if self.status.can_transition_to(target) {
            Ok(())
        } else {
            Err(self.invalid_transition(target))
        }
    }

    const fn invalid_transition(&self, target: TaskStatus) -> TaskDomainError {
        TaskDomainError::InvalidStateTransition {
            task_id: self.id,
            from: self.status,
            to: target,
        }
    }

    /// Updates the modification timestamp and advances the revision.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
        self.revision = self.revision.saturating_add(1);
    }
}

fn dedup_preserving_order(ids: Vec<TaskId>) -> Vec<TaskId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
