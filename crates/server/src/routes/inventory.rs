//! Inventory item and request endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use serde::Deserialize;

use crewdesk_core::{InventoryItemId, InventoryRequestId, ItemType, JobId};

use crate::auth::{CurrentUser, RequireAdmin};
use crate::db::items::{self, CreateItem, InventoryItem, UpdateItem};
use crate::db::requests::{self, InventoryRequestWithNames};
use crate::error::AppError;
use crate::services::inventory::{self, CreateRequest};
use crate::state::AppState;

/// Build the inventory router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/inventory/items", get(list_items).post(create_item))
        .route(
            "/api/inventory/items/{id}",
            patch(update_item).delete(delete_item),
        )
        .route("/api/inventory/items/{id}/type", patch(update_item_type))
        .route(
            "/api/inventory/requests",
            get(list_pending_requests).post(create_request),
        )
        .route("/api/inventory/requests/me", get(list_my_requests))
        .route(
            "/api/inventory/requests/{id}/approve",
            post(approve_request),
        )
        .route("/api/inventory/requests/{id}/reject", post(reject_request))
        .route(
            "/api/inventory/requests/{id}/confirm-return",
            post(confirm_return),
        )
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default, rename = "type")]
    pub item_type: ItemType,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemTypeRequest {
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub item_id: InventoryItemId,
    pub job_id: Option<JobId>,
    pub quantity: i32,
    pub reason: Option<String>,
}

/// List every item in the warehouse.
///
/// # Errors
///
/// 500 on database failure.
pub async fn list_items(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryItem>>, AppError> {
    let items = items::list_items(state.pool()).await?;
    Ok(Json(items))
}

/// Create a new item.
///
/// # Errors
///
/// 409 if the name is taken, 400 on negative quantity.
pub async fn create_item(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateItemRequest>,
) -> Result<Json<InventoryItem>, AppError> {
    if body.quantity < 0 {
        return Err(AppError::BadRequest(
            "quantity must not be negative".to_owned(),
        ));
    }

    let item = items::create_item(
        state.pool(),
        &CreateItem {
            name: body.name,
            quantity: body.quantity,
            item_type: body.item_type,
        },
    )
    .await?;

    Ok(Json(item))
}

/// Rename an item or set its quantity. A quantity update also stamps
/// the restock date.
///
/// # Errors
///
/// 404 if the item doesn't exist, 400 if the body changes nothing.
pub async fn update_item(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<InventoryItemId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<InventoryItem>, AppError> {
    if body.name.is_none() && body.quantity.is_none() {
        return Err(AppError::BadRequest("nothing to update".to_owned()));
    }
    if body.quantity.is_some_and(|q| q < 0) {
        return Err(AppError::BadRequest(
            "quantity must not be negative".to_owned(),
        ));
    }

    let item = items::update_item(
        state.pool(),
        id,
        &UpdateItem {
            name: body.name,
            quantity: body.quantity,
        },
    )
    .await?;

    Ok(Json(item))
}

/// Flip an item between consumable and reusable.
///
/// # Errors
///
/// 404 if the item doesn't exist.
pub async fn update_item_type(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<InventoryItemId>,
    Json(body): Json<UpdateItemTypeRequest>,
) -> Result<Json<InventoryItem>, AppError> {
    let item = items::update_item_type(state.pool(), id, body.item_type).await?;
    Ok(Json(item))
}

/// Delete an item.
///
/// # Errors
///
/// 404 if the item doesn't exist, 409 if requests still reference it.
pub async fn delete_item(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<InventoryItemId>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = items::delete_item(state.pool(), id).await?;
    if !deleted {
        return Err(AppError::NotFound("item not found".to_owned()));
    }
    Ok(Json(serde_json::json!({ "id": id })))
}

/// Request stock for a job. The quantity is reserved immediately.
///
/// # Errors
///
/// 409 when stock is short, 400 on a non-positive quantity.
pub async fn create_request(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<CreateRequestBody>,
) -> Result<Json<requests::InventoryRequest>, AppError> {
    let request = inventory::create_request(
        state.pool(),
        user.id,
        CreateRequest {
            item_id: body.item_id,
            job_id: body.job_id,
            quantity: body.quantity,
            reason: body.reason,
        },
    )
    .await?;

    Ok(Json(request))
}

/// List the caller's own requests, newest first.
///
/// # Errors
///
/// 500 on database failure.
pub async fn list_my_requests(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryRequestWithNames>>, AppError> {
    let list = requests::list_requests_for_user(state.pool(), user.id).await?;
    Ok(Json(list))
}

/// The admin review queue: all pending requests, oldest first.
///
/// # Errors
///
/// 500 on database failure.
pub async fn list_pending_requests(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryRequestWithNames>>, AppError> {
    let list = requests::list_pending_requests(state.pool()).await?;
    Ok(Json(list))
}

/// Approve a pending request.
///
/// # Errors
///
/// 404 if missing, 409 if not pending.
pub async fn approve_request(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<InventoryRequestId>,
) -> Result<Json<requests::InventoryRequest>, AppError> {
    let request = inventory::approve_request(state.pool(), id).await?;
    Ok(Json(request))
}

/// Reject a pending request, restoring its reserved stock.
///
/// # Errors
///
/// 404 if missing, 409 if not pending.
pub async fn reject_request(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<InventoryRequestId>,
) -> Result<Json<requests::InventoryRequest>, AppError> {
    let request = inventory::reject_request(state.pool(), id).await?;
    Ok(Json(request))
}

/// Confirm a return and restore the stock.
///
/// # Errors
///
/// 404 if missing, 409 if not awaiting return.
pub async fn confirm_return(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<InventoryRequestId>,
) -> Result<Json<requests::InventoryRequest>, AppError> {
    let request = inventory::confirm_return(state.pool(), id).await?;
    Ok(Json(request))
}
