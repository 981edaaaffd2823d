//! Workflow notifications.
//!
//! Lifecycle and deadline events are rendered into [`domain::NotificationRequest`]
//! values by [`services::NotificationComposer`] and handed to a
//! [`ports::NotificationSink`], which owns delivery and retention.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
