//! Scheduler error types.

use thiserror::Error;

use crate::notification::{ports::NotificationSinkError, services::NotificationTemplateError};
use crate::task::{
    domain::BuildingId,
    ports::{DirectoryError, TaskRepositoryError},
};

/// Errors raised while running a scheduled job or notifying about one task.
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    /// Task query failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Building lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// The sink refused or failed to store a notification.
    #[error(transparent)]
    Sink(#[from] NotificationSinkError),
    /// Notification copy could not be rendered.
    #[error(transparent)]
    Template(#[from] NotificationTemplateError),
    /// A scan window reaches past the representable date range.
    #[error("a window of {days} day(s) falls outside the supported date range")]
    DateOutOfRange {
        /// Configured window length.
        days: i64,
    },
    /// A task references a building the directory does not know.
    #[error("building {0} not found")]
    MissingBuilding(BuildingId),
}

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;
