//! In-memory adapters for the task workflow ports.

mod directory;
mod task;

pub use directory::InMemoryDirectory;
pub use task::InMemoryTaskRepository;
