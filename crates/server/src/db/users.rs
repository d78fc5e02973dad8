//! Database operations for users.
//!
//! Password hashes never leave this module except through
//! [`UserCredentials`], which only the login flow reads.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crewdesk_core::{PositionId, Role, UserId, UserStatus};

use super::{RepositoryError, map_constraint};

/// A user row with the position name joined in, hash excluded.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub image_url: Option<String>,
    pub status: UserStatus,
    pub role: Role,
    pub position_id: Option<PositionId>,
    pub position_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The subset of a user row the login flow needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: UserId,
    pub role: Role,
    pub password_hash: String,
}

/// Parameters for updating a user. `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub position_id: Option<PositionId>,
}

/// Look up the credentials for an email address.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_credentials_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserCredentials>, RepositoryError> {
    let credentials = sqlx::query_as::<_, UserCredentials>(
        "SELECT id, role, password_hash FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(credentials)
}

/// Fetch a user's public profile.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_user(pool: &PgPool, id: UserId) -> Result<Option<User>, RepositoryError> {
    let user = sqlx::query_as::<_, User>(
        r"
        SELECT u.id, u.email, u.name, u.image_url, u.status, u.role,
               u.position_id, p.name AS position_name, u.created_at
        FROM users u
        LEFT JOIN positions p ON p.id = u.position_id
        WHERE u.id = $1
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// List all users with their position names.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, RepositoryError> {
    let users = sqlx::query_as::<_, User>(
        r"
        SELECT u.id, u.email, u.name, u.image_url, u.status, u.role,
               u.position_id, p.name AS position_name, u.created_at
        FROM users u
        LEFT JOIN positions p ON p.id = u.position_id
        ORDER BY u.created_at ASC
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Insert a new user.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the email is already taken.
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    name: &str,
    role: Role,
) -> Result<User, RepositoryError> {
    let user = sqlx::query_as::<_, User>(
        r"
        INSERT INTO users (email, password_hash, name, role)
        VALUES ($1, $2, $3, $4)
        RETURNING id, email, name, image_url, status, role,
                  position_id, NULL::varchar AS position_name, created_at
        ",
    )
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .fetch_one(pool)
    .await
    .map_err(|e| map_constraint(e, "users_email_key", "email address already registered"))?;

    Ok(user)
}

/// Update a user's profile fields.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
pub async fn update_user(
    pool: &PgPool,
    id: UserId,
    params: &UpdateUser,
) -> Result<User, RepositoryError> {
    let user = sqlx::query_as::<_, User>(
        r"
        WITH updated AS (
            UPDATE users
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                position_id = COALESCE($4, position_id)
            WHERE id = $1
            RETURNING id, email, name, image_url, status, role, position_id, created_at
        )
        SELECT u.id, u.email, u.name, u.image_url, u.status, u.role,
               u.position_id, p.name AS position_name, u.created_at
        FROM updated u
        LEFT JOIN positions p ON p.id = u.position_id
        ",
    )
    .bind(id)
    .bind(&params.name)
    .bind(params.role)
    .bind(params.position_id)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(user)
}

/// Set a user's availability status.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
pub async fn update_user_status(
    pool: &PgPool,
    id: UserId,
    status: UserStatus,
) -> Result<User, RepositoryError> {
    let user = sqlx::query_as::<_, User>(
        r"
        WITH updated AS (
            UPDATE users
            SET status = $2
            WHERE id = $1
            RETURNING id, email, name, image_url, status, role, position_id, created_at
        )
        SELECT u.id, u.email, u.name, u.image_url, u.status, u.role,
               u.position_id, p.name AS position_name, u.created_at
        FROM updated u
        LEFT JOIN positions p ON p.id = u.position_id
        ",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(user)
}
