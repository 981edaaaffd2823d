//! Application services for task lifecycle orchestration.

mod authorization;
mod lifecycle;
mod request;

pub use authorization::{AuthorizationDenial, TaskAction, authorize};
pub use lifecycle::{
    ErrorKind, LifecycleConfig, MissingEntity, TaskLifecycleError, TaskLifecycleResult,
    TaskLifecycleService,
};
pub use request::{CreateTaskRequest, NoteRequest};
