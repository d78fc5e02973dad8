//! Database operations for user notifications.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crewdesk_core::{NotificationId, UserId};

use super::RepositoryError;

/// A notification row.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert a notification for a user.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_notification(
    conn: &mut PgConnection,
    user_id: UserId,
    message: &str,
) -> Result<Notification, RepositoryError> {
    let notification = sqlx::query_as::<_, Notification>(
        r"
        INSERT INTO notifications (user_id, message)
        VALUES ($1, $2)
        RETURNING id, user_id, message, is_read, created_at
        ",
    )
    .bind(user_id)
    .bind(message)
    .fetch_one(conn)
    .await?;

    Ok(notification)
}

/// List a user's latest 50 notifications, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_notifications_for_user(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Vec<Notification>, RepositoryError> {
    let notifications = sqlx::query_as::<_, Notification>(
        r"
        SELECT id, user_id, message, is_read, created_at
        FROM notifications
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT 50
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

/// Mark a notification read, only if `user_id` owns it.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the notification doesn't
/// exist or belongs to someone else.
pub async fn mark_read(
    pool: &PgPool,
    id: NotificationId,
    user_id: UserId,
) -> Result<Notification, RepositoryError> {
    let notification = sqlx::query_as::<_, Notification>(
        r"
        UPDATE notifications
        SET is_read = TRUE
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, message, is_read, created_at
        ",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(notification)
}
