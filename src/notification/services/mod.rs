//! Services that turn workflow events into notification requests.

mod composer;

pub use composer::{NotificationComposer, NotificationTemplateError};
