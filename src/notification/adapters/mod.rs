//! Notification sink adapters.

pub mod memory;

pub use memory::InMemoryNotificationSink;
