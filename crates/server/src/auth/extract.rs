//! Authentication extractors for route handlers.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crewdesk_core::{Role, UserId};

use super::AuthError;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller, extracted from the bearer token.
///
/// Rejects the request with 401 when the token is missing or invalid.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(user: CurrentUser) -> impl IntoResponse {
///     format!("user {} ({:?})", user.id, user.role)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    /// The caller's user id.
    pub id: UserId,
    /// The caller's role at token-issue time.
    pub role: Role,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MissingToken)?;

        let claims = state.keys().verify(token)?;

        Ok(Self {
            id: claims.sub,
            role: claims.role,
        })
    }
}

/// Extractor that additionally requires the admin role.
///
/// Rejects with 401 when unauthenticated and 403 when the caller is an
/// employee.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            return Err(AppError::Forbidden("admin role required".to_string()));
        }

        Ok(Self(user))
    }
}
