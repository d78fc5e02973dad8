//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use serde::Deserialize;

use crewdesk_core::{PositionId, Role, UserId, UserStatus};

use crate::auth::{CurrentUser, RequireAdmin};
use crate::db::users::{self, UpdateUser, User};
use crate::error::AppError;
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/me", get(me))
        .route("/api/users/{id}", patch(update_user))
        .route("/api/users/{id}/status", patch(update_status))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub position_id: Option<PositionId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: UserStatus,
}

/// The caller's own profile.
///
/// # Errors
///
/// 404 if the account was deleted after the token was issued.
pub async fn me(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let profile = users::find_user(state.pool(), user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;
    Ok(Json(profile))
}

/// Every user with their position.
///
/// # Errors
///
/// 500 on database failure.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, AppError> {
    let list = users::list_users(state.pool()).await?;
    Ok(Json(list))
}

/// Edit a user's name, role or position.
///
/// # Errors
///
/// 404 if the user doesn't exist, 400 if the body changes nothing.
pub async fn update_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    if body.name.is_none() && body.role.is_none() && body.position_id.is_none() {
        return Err(AppError::BadRequest("nothing to update".to_owned()));
    }

    let user = users::update_user(
        state.pool(),
        id,
        &UpdateUser {
            name: body.name,
            role: body.role,
            position_id: body.position_id,
        },
    )
    .await?;

    Ok(Json(user))
}

/// Set a user's availability.
///
/// # Errors
///
/// 404 if the user doesn't exist.
pub async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<User>, AppError> {
    let user = users::update_user_status(state.pool(), id, body.status).await?;
    Ok(Json(user))
}
