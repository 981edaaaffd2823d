//! Ports for notification delivery.

pub mod sink;

pub use sink::{NotificationSink, NotificationSinkError, NotificationSinkResult};
