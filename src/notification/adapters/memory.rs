//! In-memory notification sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::{Arc, RwLock};

use crate::notification::{
    domain::{Notification, NotificationId, NotificationKind, NotificationRequest},
    ports::{NotificationSink, NotificationSinkError, NotificationSinkResult},
};
use crate::task::domain::UserId;

/// Thread-safe in-memory notification sink that keeps every notification
/// until cleanup.
pub struct InMemoryNotificationSink<C>
where
    C: Clock + Send + Sync,
{
    notifications: Arc<RwLock<Vec<Notification>>>,
    clock: Arc<C>,
}

impl<C> Clone for InMemoryNotificationSink<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            notifications: Arc::clone(&self.notifications),
            clock: Arc::clone(&self.clock),
        }
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> NotificationSinkError {
    NotificationSinkError::persistence(std::io::Error::other(err.to_string()))
}

impl<C> InMemoryNotificationSink<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty sink stamping notifications with `clock`.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            notifications: Arc::new(RwLock::new(Vec::new())),
            clock,
        }
    }

    /// Returns every stored notification in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationSinkError::Persistence`] when the lock is
    /// poisoned.
    pub fn all(&self) -> NotificationSinkResult<Vec<Notification>> {
        Ok(self.notifications.read().map_err(poisoned)?.clone())
    }

    /// Returns the notifications addressed to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationSinkError::Persistence`] when the lock is
    /// poisoned.
    pub fn for_recipient(&self, recipient: UserId) -> NotificationSinkResult<Vec<Notification>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|notification| notification.recipient() == recipient)
            .collect())
    }

    /// Returns the notifications of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationSinkError::Persistence`] when the lock is
    /// poisoned.
    pub fn of_kind(&self, kind: NotificationKind) -> NotificationSinkResult<Vec<Notification>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|notification| notification.kind() == kind)
            .collect())
    }

    /// Marks a notification read on behalf of its recipient.
    ///
    /// Returns `false` when no notification with that identifier exists.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationSinkError::Persistence`] when the lock is
    /// poisoned.
    pub fn mark_read(&self, id: NotificationId) -> NotificationSinkResult<bool> {
        let mut notifications = self.notifications.write().map_err(poisoned)?;
        let found = notifications
            .iter_mut()
            .find(|notification| notification.id() == id);
        Ok(found.is_some_and(|notification| {
            notification.mark_read(&*self.clock);
            true
        }))
    }

    fn retain(&self, keep: impl Fn(&Notification) -> bool) -> NotificationSinkResult<usize> {
        let mut notifications = self.notifications.write().map_err(poisoned)?;
        let before = notifications.len();
        notifications.retain(|notification| keep(notification));
        Ok(before - notifications.len())
    }
}

#[async_trait]
impl<C> NotificationSink for InMemoryNotificationSink<C>
where
    C: Clock + Send + Sync,
{
    async fn create(&self, request: NotificationRequest) -> NotificationSinkResult<NotificationId> {
        if request.title.trim().is_empty() || request.message.trim().is_empty() {
            return Err(NotificationSinkError::Rejected(
                "title and message are required".to_owned(),
            ));
        }
        let notification = Notification::from_request(request, &*self.clock);
        let id = notification.id();
        self.notifications
            .write()
            .map_err(poisoned)?
            .push(notification);
        Ok(id)
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> NotificationSinkResult<usize> {
        self.retain(|notification| !notification.is_expired(now))
    }

    async fn cleanup_read_before(&self, cutoff: DateTime<Utc>) -> NotificationSinkResult<usize> {
        self.retain(|notification| !(notification.is_read() && notification.created_at() < cutoff))
    }
}
