//! Port contracts for the task workflow.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod directory;
pub mod repository;
pub mod update_log;

pub use directory::{BuildingDirectory, DirectoryError, DirectoryResult, UserDirectory};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
pub use update_log::{TaskUpdateLog, UpdateOrder};
