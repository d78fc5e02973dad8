//! Position endpoints.

use axum::{Json, Router, extract::State, routing::get};

use crate::auth::CurrentUser;
use crate::db::positions::{self, Position};
use crate::error::AppError;
use crate::state::AppState;

/// Build the positions router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/positions", get(list_positions))
}

/// Every position, alphabetically.
///
/// # Errors
///
/// 500 on database failure.
pub async fn list_positions(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Position>>, AppError> {
    let list = positions::list_positions(state.pool()).await?;
    Ok(Json(list))
}
