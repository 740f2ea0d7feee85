use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewNotification, Notification},
    traits::{NotificationError, NotificationManagement},
};

pub struct NotificationsApi<B> {
    db: B,
}

impl<B: Debug> Debug for NotificationsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NotificationsApi ({:?})", self.db)
    }
}

impl<B> NotificationsApi<B>
where B: NotificationManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn notify(&self, notification: NewNotification) -> Result<Notification, NotificationError> {
        let notification = self.db.create_notification(notification).await?;
        trace!("🔄️🔔️ Notification #{} sent to user #{}", notification.id, notification.user_id);
        Ok(notification)
    }

    pub async fn notifications(&self, user_id: i64, unread_only: bool) -> Result<Vec<Notification>, NotificationError> {
        self.db.fetch_notifications(user_id, unread_only).await
    }

    pub async fn mark_read(&self, user_id: i64, notification_id: i64) -> Result<Notification, NotificationError> {
        self.db.mark_notification_read(user_id, notification_id).await
    }
}
