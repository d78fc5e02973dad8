//! Notification endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};

use crewdesk_core::NotificationId;

use crate::auth::CurrentUser;
use crate::db::notifications::{self, Notification};
use crate::error::AppError;
use crate::state::AppState;

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications/me", get(list_my_notifications))
        .route("/api/notifications/{id}/read", patch(mark_read))
}

/// The caller's latest 50 notifications.
///
/// # Errors
///
/// 500 on database failure.
pub async fn list_my_notifications(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let list = notifications::list_notifications_for_user(state.pool(), user.id).await?;
    Ok(Json(list))
}

/// Mark one of the caller's notifications read.
///
/// # Errors
///
/// 404 if the notification doesn't exist or belongs to someone else.
pub async fn mark_read(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
) -> Result<Json<Notification>, AppError> {
    let notification = notifications::mark_read(state.pool(), id, user.id).await?;
    Ok(Json(notification))
}
