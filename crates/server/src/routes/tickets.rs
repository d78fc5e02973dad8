//! Maintenance ticket endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use serde::Deserialize;

use crewdesk_core::{TicketCategory, TicketId, TicketPriority, TicketStatus, UserId};

use crate::auth::{CurrentUser, RequireAdmin};
use crate::db::tickets::{self, CreateTicket, Ticket, UpdateTicket};
use crate::error::AppError;
use crate::state::AppState;

/// Build the tickets router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tickets", get(list_all_tickets).post(create_ticket))
        .route("/api/tickets/me", get(list_my_tickets))
        .route("/api/tickets/{id}", patch(update_ticket))
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub status: Option<TicketStatus>,
    pub assigned_to_id: Option<UserId>,
}

/// Report a problem.
///
/// # Errors
///
/// 400 on an empty title or description.
pub async fn create_ticket(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<CreateTicketRequest>,
) -> Result<Json<Ticket>, AppError> {
    if body.title.trim().is_empty() || body.description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "title and description must not be empty".to_owned(),
        ));
    }

    let ticket = tickets::create_ticket(
        state.pool(),
        &CreateTicket {
            title: body.title,
            description: body.description,
            category: body.category,
            priority: body.priority,
        },
        user.id,
    )
    .await?;

    Ok(Json(ticket))
}

/// The caller's own tickets, newest first.
///
/// # Errors
///
/// 500 on database failure.
pub async fn list_my_tickets(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let list = tickets::list_tickets_for_user(state.pool(), user.id).await?;
    Ok(Json(list))
}

/// Every ticket, newest first.
///
/// # Errors
///
/// 500 on database failure.
pub async fn list_all_tickets(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let list = tickets::list_all_tickets(state.pool()).await?;
    Ok(Json(list))
}

/// Change a ticket's status or assignee.
///
/// # Errors
///
/// 404 if the ticket doesn't exist, 400 if the body changes nothing.
pub async fn update_ticket(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TicketId>,
    Json(body): Json<UpdateTicketRequest>,
) -> Result<Json<Ticket>, AppError> {
    if body.status.is_none() && body.assigned_to_id.is_none() {
        return Err(AppError::BadRequest("nothing to update".to_owned()));
    }

    let ticket = tickets::update_ticket(
        state.pool(),
        id,
        &UpdateTicket {
            status: body.status,
            assigned_to_id: body.assigned_to_id,
        },
    )
    .await?;

    Ok(Json(ticket))
}
