//! Notification sink port.

use crate::notification::domain::{NotificationId, NotificationRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification sink operations.
pub type NotificationSinkResult<T> = Result<T, NotificationSinkError>;

/// Accepts notification requests and owns their delivery and retention.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Records a notification for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationSinkError`] when the sink cannot accept the
    /// request.
    async fn create(&self, request: NotificationRequest) -> NotificationSinkResult<NotificationId>;

    /// Deletes notifications whose expiry lies before `now`, returning how
    /// many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationSinkError`] when the sink cannot be purged.
    async fn cleanup_expired(&self, now: DateTime<Utc>) -> NotificationSinkResult<usize>;

    /// Deletes read notifications created before `cutoff`, returning how
    /// many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationSinkError`] when the sink cannot be purged.
    async fn cleanup_read_before(&self, cutoff: DateTime<Utc>) -> NotificationSinkResult<usize>;
}

/// Errors returned by notification sink implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationSinkError {
    /// The sink rejected the request.
    #[error("notification rejected: {0}")]
    Rejected(String),

    /// Storage or transport failure.
    #[error("notification sink failure: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationSinkError {
    /// Wraps a storage or transport error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
