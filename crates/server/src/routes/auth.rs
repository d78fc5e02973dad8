//! Login endpoint.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::auth::{self, AuthError};
use crate::db::users;
use crate::error::AppError;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Exchange email and password for a bearer token.
///
/// Unknown emails and wrong passwords both answer 401 with the same
/// message, so the response doesn't reveal which accounts exist.
///
/// # Errors
///
/// 401 on bad credentials.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let credentials = users::find_credentials_by_email(state.pool(), &body.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let matches = auth::verify_password(&body.password, &credentials.password_hash).await?;
    if !matches {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.keys().issue(
        credentials.id,
        credentials.role,
        state.config().token_ttl_hours,
    )?;

    Ok(Json(LoginResponse {
        access_token: token,
    }))
}
