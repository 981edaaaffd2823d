//! Port for reading and appending task audit entries.

use super::TaskRepositoryResult;
use crate::task::domain::{TaskId, TaskUpdate};
use async_trait::async_trait;

/// Ordering of audit entries by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateOrder {
    /// Oldest entry first.
    OldestFirst,
    /// Newest entry first.
    #[default]
    NewestFirst,
}

/// Append-only audit log contract.
///
/// Entries produced by lifecycle transitions are written through
/// [`super::TaskRepository`] alongside the task; this port covers manual
/// notes and reads.
#[async_trait]
pub trait TaskUpdateLog: Send + Sync {
    /// Appends a standalone audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskRepositoryError::NotFound`] when the referenced
    /// task does not exist.
    async fn append(&self, update: &TaskUpdate) -> TaskRepositoryResult<()>;

    /// Returns every audit entry of the task in the requested order.
    async fn find_by_task(
        &self,
        task_id: TaskId,
        order: UpdateOrder,
    ) -> TaskRepositoryResult<Vec<TaskUpdate>>;
}
