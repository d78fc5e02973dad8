//! Database operations for inventory requests.
//!
//! Status writes here are plain row updates; the legality of a
//! transition is checked by the service layer against
//! `RequestStatus::can_transition_to` after locking the row with
//! [`find_request_for_update`].

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crewdesk_core::{
    InventoryItemId, InventoryRequestId, ItemType, JobId, RequestStatus, ReturnStatus, UserId,
};

use super::RepositoryError;

/// An inventory request row.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct InventoryRequest {
    pub id: InventoryRequestId,
    pub requester_id: UserId,
    pub item_id: InventoryItemId,
    pub job_id: Option<JobId>,
    pub quantity: i32,
    pub reason: Option<String>,
    pub status: RequestStatus,
    pub return_status: Option<ReturnStatus>,
    pub return_notes: Option<String>,
    pub requested_at: DateTime<Utc>,
}

/// A request row joined with the requester and item names, for listings.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct InventoryRequestWithNames {
    pub id: InventoryRequestId,
    pub requester_id: UserId,
    pub requester_name: String,
    pub item_id: InventoryItemId,
    pub item_name: String,
    pub job_id: Option<JobId>,
    pub quantity: i32,
    pub reason: Option<String>,
    pub status: RequestStatus,
    pub return_status: Option<ReturnStatus>,
    pub return_notes: Option<String>,
    pub requested_at: DateTime<Utc>,
}

/// A request joined with its item's type, for the job-completion
/// restock pass.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RequestWithItemType {
    pub id: InventoryRequestId,
    pub item_id: InventoryItemId,
    pub quantity: i32,
    pub item_type: ItemType,
}

/// Insert a new request row with status `pending`.
///
/// Must run in the same transaction as the stock reservation.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_request(
    conn: &mut PgConnection,
    requester_id: UserId,
    item_id: InventoryItemId,
    job_id: Option<JobId>,
    quantity: i32,
    reason: Option<&str>,
) -> Result<InventoryRequest, RepositoryError> {
    let request = sqlx::query_as::<_, InventoryRequest>(
        r"
        INSERT INTO inventory_requests (requester_id, item_id, job_id, quantity, reason)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, requester_id, item_id, job_id, quantity, reason, status,
                  return_status, return_notes, requested_at
        ",
    )
    .bind(requester_id)
    .bind(item_id)
    .bind(job_id)
    .bind(quantity)
    .bind(reason)
    .fetch_one(conn)
    .await?;

    Ok(request)
}

/// Fetch a request row and lock it for the rest of the transaction.
///
/// The `FOR UPDATE` lock orders concurrent transitions on the same
/// request: whichever transaction commits first wins, and the loser
/// sees the committed status and fails its transition check.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_request_for_update(
    conn: &mut PgConnection,
    id: InventoryRequestId,
) -> Result<Option<InventoryRequest>, RepositoryError> {
    let request = sqlx::query_as::<_, InventoryRequest>(
        r"
        SELECT id, requester_id, item_id, job_id, quantity, reason, status,
               return_status, return_notes, requested_at
        FROM inventory_requests
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(request)
}

/// Set a request's status.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the request doesn't exist.
pub async fn set_status(
    conn: &mut PgConnection,
    id: InventoryRequestId,
    status: RequestStatus,
) -> Result<InventoryRequest, RepositoryError> {
    let request = sqlx::query_as::<_, InventoryRequest>(
        r"
        UPDATE inventory_requests
        SET status = $2
        WHERE id = $1
        RETURNING id, requester_id, item_id, job_id, quantity, reason, status,
                  return_status, return_notes, requested_at
        ",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(conn)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(request)
}

/// Record the return disposition of a borrowed item.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the request doesn't exist.
pub async fn set_return_disposition(
    conn: &mut PgConnection,
    id: InventoryRequestId,
    return_status: ReturnStatus,
    return_notes: Option<&str>,
) -> Result<InventoryRequest, RepositoryError> {
    let request = sqlx::query_as::<_, InventoryRequest>(
        r"
        UPDATE inventory_requests
        SET return_status = $2, return_notes = $3
        WHERE id = $1
        RETURNING id, requester_id, item_id, job_id, quantity, reason, status,
                  return_status, return_notes, requested_at
        ",
    )
    .bind(id)
    .bind(return_status)
    .bind(return_notes)
    .fetch_optional(conn)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(request)
}

/// List a user's own requests, newest first, with item names.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_requests_for_user(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Vec<InventoryRequestWithNames>, RepositoryError> {
    let requests = sqlx::query_as::<_, InventoryRequestWithNames>(
        r"
        SELECT
            r.id, r.requester_id, u.name AS requester_name,
            r.item_id, i.name AS item_name,
            r.job_id, r.quantity, r.reason, r.status,
            r.return_status, r.return_notes, r.requested_at
        FROM inventory_requests r
        INNER JOIN users u ON u.id = r.requester_id
        INNER JOIN inventory_items i ON i.id = r.item_id
        WHERE r.requester_id = $1
        ORDER BY r.requested_at DESC
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

/// List all pending requests, oldest first, for the admin review queue.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_pending_requests(
    pool: &PgPool,
) -> Result<Vec<InventoryRequestWithNames>, RepositoryError> {
    let requests = sqlx::query_as::<_, InventoryRequestWithNames>(
        r"
        SELECT
            r.id, r.requester_id, u.name AS requester_name,
            r.item_id, i.name AS item_name,
            r.job_id, r.quantity, r.reason, r.status,
            r.return_status, r.return_notes, r.requested_at
        FROM inventory_requests r
        INNER JOIN users u ON u.id = r.requester_id
        INNER JOIN inventory_items i ON i.id = r.item_id
        WHERE r.status = 'pending'
        ORDER BY r.requested_at ASC
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

/// List a job's approved requests with their item types, locking the
/// request rows for the enclosing transaction.
///
/// Used by the bulk restock pass on job completion.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_approved_for_job(
    conn: &mut PgConnection,
    job_id: JobId,
) -> Result<Vec<RequestWithItemType>, RepositoryError> {
    let requests = sqlx::query_as::<_, RequestWithItemType>(
        r"
        SELECT r.id, r.item_id, r.quantity, i.type AS item_type
        FROM inventory_requests r
        INNER JOIN inventory_items i ON i.id = r.item_id
        WHERE r.job_id = $1 AND r.status = 'approved'
        ORDER BY r.requested_at ASC
        FOR UPDATE OF r
        ",
    )
    .bind(job_id)
    .fetch_all(conn)
    .await?;

    Ok(requests)
}
