//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus, UpdateType};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// The deadline precedes the start date.
    #[error("deadline {deadline} precedes start date {start_date}")]
    DeadlineBeforeStart {
        /// Requested start date.
        start_date: NaiveDate,
        /// Requested deadline.
        deadline: NaiveDate,
    },

    /// The progress percentage is outside `0..=100`.
    #[error("progress percentage must be between 0 and 100, got {0}")]
    InvalidProgress(i32),

    /// A rejection was requested without a reason.
    #[error("rejection reason must not be empty")]
    EmptyRejectionReason,

    /// A manual note was submitted without a message.
    #[error("task update message must not be empty")]
    EmptyUpdateMessage,

    /// A manual note used an update type reserved for lifecycle transitions.
    #[error("update type {0} is recorded by lifecycle transitions only")]
    ReservedUpdateType(UpdateType),

    /// A direct status change targeted a status owned by a dedicated operation.
    #[error("status {0} can only be reached through its dedicated operation")]
    ReservedStatus(TaskStatus),

    /// The requested state transition is not allowed.
    #[error("task {task_id} cannot transition from {from} to {to}")]
    InvalidStateTransition {
        /// Task being transitioned.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// The task has recorded work or has left the pre-progress states.
    #[error("task {task_id} in status {status} with recorded work cannot be deleted")]
    NotDeletable {
        /// Task whose deletion was requested.
        task_id: TaskId,
        /// Current status.
        status: TaskStatus,
    },

    /// Other tasks still depend on the task.
    #[error("task {task_id} is a dependency of {dependents} other task(s)")]
    HasDependents {
        /// Task whose deletion was requested.
        task_id: TaskId,
        /// Number of dependent tasks.
        dependents: usize,
    },

    /// A task listed itself as a dependency.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// The dependency edges would form a cycle.
    #[error("dependency cycle detected: {}", format_cycle(.0))]
    DependencyCycle(Vec<TaskId>),

    /// A transition requires every dependency to be satisfied.
    #[error("task {task_id} has {pending} unsatisfied dependencies")]
    DependenciesUnsatisfied {
        /// Task being started or completed.
        task_id: TaskId,
        /// Number of dependencies not yet completed or approved.
        pending: usize,
    },

    /// The task is in a terminal state and cannot be edited.
    #[error("task {task_id} is {status} and can no longer be edited")]
    TerminalTask {
        /// Task being edited.
        task_id: TaskId,
        /// Current terminal status.
        status: TaskStatus,
    },
}

fn format_cycle(cycle: &[TaskId]) -> String {
    cycle
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);

/// Error returned while parsing task types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task type: {0}")]
pub struct ParseTaskTypeError(pub String);

/// Error returned while parsing task update types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task update type: {0}")]
pub struct ParseUpdateTypeError(pub String);
