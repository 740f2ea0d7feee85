use thiserror::Error;

use crate::db_types::{NewNotification, Notification};

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Notification #{0} does not exist")]
    NotificationNotFound(i64),
}

impl From<sqlx::Error> for NotificationError {
    fn from(e: sqlx::Error) -> Self {
        NotificationError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait NotificationManagement {
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification, NotificationError>;

    /// Newest first
    async fn fetch_notifications(&self, user_id: i64, unread_only: bool) -> Result<Vec<Notification>, NotificationError>;

    /// Only the owner's notifications can be marked. Anything else is reported as not found.
    async fn mark_notification_read(&self, user_id: i64, notification_id: i64) -> Result<Notification, NotificationError>;
}
