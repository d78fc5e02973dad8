//! Database operations for maintenance tickets.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crewdesk_core::{TicketCategory, TicketId, TicketPriority, TicketStatus, UserId};

use super::RepositoryError;

/// A ticket row joined with reporter and assignee names.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub reported_by_id: UserId,
    pub reporter_name: String,
    pub assigned_to_id: Option<UserId>,
    pub assignee_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Parameters for creating a ticket.
#[derive(Debug)]
pub struct CreateTicket {
    pub title: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
}

/// Parameters for updating a ticket. `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct UpdateTicket {
    pub status: Option<TicketStatus>,
    pub assigned_to_id: Option<UserId>,
}

/// Insert a new ticket with status `open`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create_ticket(
    pool: &PgPool,
    params: &CreateTicket,
    reporter_id: UserId,
) -> Result<Ticket, RepositoryError> {
    let ticket = sqlx::query_as::<_, Ticket>(
        r"
        WITH inserted AS (
            INSERT INTO tickets (title, description, category, priority, reported_by_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, category, priority, status,
                      reported_by_id, assigned_to_id, created_at, resolved_at
        )
        SELECT t.id, t.title, t.description, t.category, t.priority, t.status,
               t.reported_by_id, r.name AS reporter_name,
               t.assigned_to_id, NULL::varchar AS assignee_name,
               t.created_at, t.resolved_at
        FROM inserted t
        INNER JOIN users r ON r.id = t.reported_by_id
        ",
    )
    .bind(&params.title)
    .bind(&params.description)
    .bind(params.category)
    .bind(params.priority)
    .bind(reporter_id)
    .fetch_one(pool)
    .await?;

    Ok(ticket)
}

/// List the tickets a user reported, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_tickets_for_user(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Vec<Ticket>, RepositoryError> {
    let tickets = sqlx::query_as::<_, Ticket>(
        r"
        SELECT t.id, t.title, t.description, t.category, t.priority, t.status,
               t.reported_by_id, r.name AS reporter_name,
               t.assigned_to_id, a.name AS assignee_name,
               t.created_at, t.resolved_at
        FROM tickets t
        INNER JOIN users r ON r.id = t.reported_by_id
        LEFT JOIN users a ON a.id = t.assigned_to_id
        WHERE t.reported_by_id = $1
        ORDER BY t.created_at DESC
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(tickets)
}

/// List all tickets, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_all_tickets(pool: &PgPool) -> Result<Vec<Ticket>, RepositoryError> {
    let tickets = sqlx::query_as::<_, Ticket>(
        r"
        SELECT t.id, t.title, t.description, t.category, t.priority, t.status,
               t.reported_by_id, r.name AS reporter_name,
               t.assigned_to_id, a.name AS assignee_name,
               t.created_at, t.resolved_at
        FROM tickets t
        INNER JOIN users r ON r.id = t.reported_by_id
        LEFT JOIN users a ON a.id = t.assigned_to_id
        ORDER BY t.created_at DESC
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(tickets)
}

/// Update a ticket's status or assignee. Moving to `resolved` stamps
/// `resolved_at`.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the ticket doesn't exist.
pub async fn update_ticket(
    pool: &PgPool,
    id: TicketId,
    params: &UpdateTicket,
) -> Result<Ticket, RepositoryError> {
    let ticket = sqlx::query_as::<_, Ticket>(
        r"
        WITH updated AS (
            UPDATE tickets
            SET status = COALESCE($2, status),
                assigned_to_id = COALESCE($3, assigned_to_id),
                resolved_at = CASE WHEN $2 = 'resolved' THEN NOW() ELSE resolved_at END
            WHERE id = $1
            RETURNING id, title, description, category, priority, status,
                      reported_by_id, assigned_to_id, created_at, resolved_at
        )
        SELECT t.id, t.title, t.description, t.category, t.priority, t.status,
               t.reported_by_id, r.name AS reporter_name,
               t.assigned_to_id, a.name AS assignee_name,
               t.created_at, t.resolved_at
        FROM updated t
        INNER JOIN users r ON r.id = t.reported_by_id
        LEFT JOIN users a ON a.id = t.assigned_to_id
        ",
    )
    .bind(id)
    .bind(params.status)
    .bind(params.assigned_to_id)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(ticket)
}
