//! Database operations for job positions.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crewdesk_core::PositionId;

use super::RepositoryError;

/// A position row.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Position {
    pub id: PositionId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// List all positions, alphabetically.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_positions(pool: &PgPool) -> Result<Vec<Position>, RepositoryError> {
    let positions = sqlx::query_as::<_, Position>(
        "SELECT id, name, description, created_at FROM positions ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(positions)
}
