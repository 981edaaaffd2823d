//! Repository port for task persistence and lookup.

use crate::task::domain::{BuildingId, Task, TaskId, TaskStatus, TaskUpdate, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Writes pair the task with the audit entry describing the change and must
/// be applied atomically: either both are persisted or neither is.
///
/// Implementations own dependency integrity. The checks below run in the
/// same critical section as the write, so two writers that each passed a
/// service-level check cannot together leave a dangling dependency or a
/// cycle behind.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task together with its creation audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists and [`TaskRepositoryError::MissingDependency`] when a listed
    /// dependency is not stored.
    async fn store(&self, task: &Task, audit: &TaskUpdate) -> TaskRepositoryResult<()>;

    /// Persists a modified task and appends its audit entry.
    ///
    /// The stored revision must be exactly one behind `task.revision()`;
    /// otherwise another writer got there first. When the dependency set
    /// changes, every dependency must be stored and the resulting graph must
    /// stay acyclic.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist,
    /// [`TaskRepositoryError::RevisionConflict`] on a stale write,
    /// [`TaskRepositoryError::MissingDependency`] for an unknown dependency
    /// and [`TaskRepositoryError::DependencyCycle`] when the new edges close a
    /// cycle.
    async fn update(&self, task: &Task, audit: &TaskUpdate) -> TaskRepositoryResult<()>;

    /// Removes a task whose stored revision equals `expected_revision` and
    /// that no stored task depends on.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist,
    /// [`TaskRepositoryError::RevisionConflict`] on a stale delete and
    /// [`TaskRepositoryError::HasDependents`] while another task lists it.
    async fn delete(&self, id: TaskId, expected_revision: u64) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the tasks matching the given identifiers; unknown identifiers
    /// are skipped.
    async fn find_by_ids(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns every task in the given status.
    async fn find_by_status(&self, status: TaskStatus) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns tasks whose deadline lies within `from..=to`.
    async fn find_by_deadline_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns tasks whose deadline is before `today` and whose status is not
    /// completed, approved or cancelled.
    async fn find_overdue(&self, today: NaiveDate) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns tasks assigned to the contractor, ordered by deadline.
    async fn find_by_contractor(&self, contractor: UserId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns tasks of the building, ordered by start date.
    async fn find_by_building(&self, building: BuildingId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns tasks that list `dependency` among their dependencies.
    async fn find_dependents(&self, dependency: TaskId) -> TaskRepositoryResult<Vec<Task>>;

    /// Counts tasks in the given status.
    async fn count_by_status(&self, status: TaskStatus) -> TaskRepositoryResult<usize>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored task changed since it was read.
    #[error("task {task_id} was modified concurrently (stored revision {stored}, write based on {expected})")]
    RevisionConflict {
        /// Task being written.
        task_id: TaskId,
        /// Revision the writer based its change on.
        expected: u64,
        /// Revision currently stored.
        stored: u64,
    },

    /// A written task lists a dependency that is not stored.
    #[error("task {task_id} depends on unknown task {dependency}")]
    MissingDependency {
        /// Task being written.
        task_id: TaskId,
        /// Dependency that does not exist.
        dependency: TaskId,
    },

    /// The written dependency set closes a cycle; holds the cycle path.
    #[error("dependency cycle through {} task(s)", .0.len().saturating_sub(1))]
    DependencyCycle(Vec<TaskId>),

    /// The task cannot be removed while other tasks depend on it.
    #[error("task {task_id} has {dependents} dependent task(s)")]
    HasDependents {
        /// Task whose removal was requested.
        task_id: TaskId,
        /// Number of dependent tasks.
        dependents: usize,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
