use chrono::Utc;
use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{NewNotification, Notification};

pub async fn insert_notification(
    notification: NewNotification,
    conn: &mut SqliteConnection,
) -> Result<Notification, sqlx::Error> {
    let result: Notification = sqlx::query_as(
        "INSERT INTO notifications (user_id, title, message, created_at) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(notification.user_id)
    .bind(notification.title)
    .bind(notification.message)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Notification #{} stored for user #{}", result.id, result.user_id);
    Ok(result)
}

pub async fn fetch_notifications(
    user_id: i64,
    unread_only: bool,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, sqlx::Error> {
    let sql = if unread_only {
        "SELECT * FROM notifications WHERE user_id = $1 AND read = FALSE ORDER BY created_at DESC, id DESC"
    } else {
        "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
    };
    sqlx::query_as(sql).bind(user_id).fetch_all(conn).await
}

pub async fn count_unread(user_id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE")
        .bind(user_id)
        .fetch_one(conn)
        .await
}

pub async fn mark_read(
    user_id: i64,
    notification_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Notification>, sqlx::Error> {
    sqlx::query_as("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2 RETURNING *")
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
}
