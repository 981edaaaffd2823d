//! Domain model for the construction task workflow.
//!
//! The task domain models the task aggregate and its status machine, the
//! append-only audit trail, the parties involved (builders, contractors,
//! buildings) and dependency gating, while keeping all infrastructure
//! concerns outside of the domain boundary.

mod dependency;
mod error;
mod ids;
mod party;
mod status;
mod task;
mod update;

pub use dependency::{DependencyGraph, DependencyResolver, TemporalConflict};
pub use error::{
    ParsePriorityError, ParseTaskStatusError, ParseTaskTypeError, ParseUpdateTypeError,
    TaskDomainError,
};
pub use ids::{BuildingId, Progress, TaskId, TaskUpdateId, UserId};
pub use party::{Building, Role, User};
pub use status::{Priority, TaskStatus, TaskType};
pub use task::{PersistedTaskData, Task, TaskDraft};
pub use update::{TaskUpdate, UpdateType};
