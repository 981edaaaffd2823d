//! Domain model for workflow notifications.

mod kind;
mod notification;

pub use kind::{NotificationId, NotificationKind, ParseNotificationKindError};
pub use notification::{Notification, NotificationRequest};
