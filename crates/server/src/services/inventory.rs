//! Inventory request workflows.
//!
//! Stock is reserved pessimistically: the decrement happens when the
//! request is created, not when it is approved. Approval therefore
//! never touches the ledger; rejection and return confirmation are the
//! two paths that give the reservation back.

use sqlx::PgPool;

use crewdesk_core::{InventoryItemId, InventoryRequestId, JobId, RequestStatus, UserId};

use super::ServiceError;
use crate::db::requests::InventoryRequest;
use crate::db::{items, notifications, requests};

/// Input for creating an inventory request.
#[derive(Debug)]
pub struct CreateRequest {
    pub item_id: InventoryItemId,
    pub job_id: Option<JobId>,
    pub quantity: i32,
    pub reason: Option<String>,
}

/// Create a request and reserve its stock, atomically.
///
/// The conditional decrement and the request insert share one
/// transaction: if the stock is short the insert never happens, and if
/// the insert fails the decrement rolls back.
///
/// # Errors
///
/// `Validation` for a non-positive quantity, `InsufficientStock` when
/// the item is missing or short.
pub async fn create_request(
    pool: &PgPool,
    requester_id: UserId,
    input: CreateRequest,
) -> Result<InventoryRequest, ServiceError> {
    if input.quantity <= 0 {
        return Err(ServiceError::Validation(
            "quantity must be positive".to_owned(),
        ));
    }

    let mut tx = pool.begin().await?;

    items::reserve_stock(&mut tx, input.item_id, input.quantity).await?;
    let request = requests::insert_request(
        &mut tx,
        requester_id,
        input.item_id,
        input.job_id,
        input.quantity,
        input.reason.as_deref(),
    )
    .await?;

    tx.commit().await?;
    Ok(request)
}

/// Approve a pending request. Stock stays deducted.
///
/// # Errors
///
/// `NotFound` if the request doesn't exist, `InvalidState` if it is
/// not pending.
pub async fn approve_request(
    pool: &PgPool,
    id: InventoryRequestId,
) -> Result<InventoryRequest, ServiceError> {
    let mut tx = pool.begin().await?;

    let request = requests::find_request_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("request".to_owned()))?;
    ensure_transition(request.status, RequestStatus::Approved)?;

    let request = requests::set_status(&mut tx, id, RequestStatus::Approved).await?;
    notifications::insert_notification(
        &mut tx,
        request.requester_id,
        "Your inventory request has been approved",
    )
    .await?;

    tx.commit().await?;
    Ok(request)
}

/// Reject a pending request and give its reservation back.
///
/// The release uses the quantity stored on the request row, which is
/// immutable for the request's lifetime.
///
/// # Errors
///
/// `NotFound` if the request doesn't exist, `InvalidState` if it is
/// not pending.
pub async fn reject_request(
    pool: &PgPool,
    id: InventoryRequestId,
) -> Result<InventoryRequest, ServiceError> {
    let mut tx = pool.begin().await?;

    let request = requests::find_request_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("request".to_owned()))?;
    if request.status != RequestStatus::Pending {
        return Err(ServiceError::InvalidState(
            "can only reject pending requests".to_owned(),
        ));
    }

    items::release_stock(&mut tx, request.item_id, request.quantity).await?;
    let request = requests::set_status(&mut tx, id, RequestStatus::Rejected).await?;
    notifications::insert_notification(
        &mut tx,
        request.requester_id,
        "Your inventory request has been rejected",
    )
    .await?;

    tx.commit().await?;
    Ok(request)
}

/// Confirm the return of a borrowed item: restore the stock and close
/// the request.
///
/// # Errors
///
/// `NotFound` if the request doesn't exist, `InvalidState` if it is
/// not awaiting return.
pub async fn confirm_return(
    pool: &PgPool,
    id: InventoryRequestId,
) -> Result<InventoryRequest, ServiceError> {
    let mut tx = pool.begin().await?;

    let request = requests::find_request_for_update(&mut tx, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("request".to_owned()))?;
    ensure_transition(request.status, RequestStatus::Returned)?;

    items::release_stock(&mut tx, request.item_id, request.quantity).await?;
    let request = requests::set_status(&mut tx, id, RequestStatus::Returned).await?;

    tx.commit().await?;
    Ok(request)
}

fn ensure_transition(from: RequestStatus, to: RequestStatus) -> Result<(), ServiceError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "cannot move request from {from:?} to {to:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_guard_allows_pending_to_approved() {
        assert!(ensure_transition(RequestStatus::Pending, RequestStatus::Approved).is_ok());
    }

    #[test]
    fn transition_guard_blocks_terminal_states() {
        let err = ensure_transition(RequestStatus::Rejected, RequestStatus::Approved);
        assert!(matches!(err, Err(ServiceError::InvalidState(_))));

        let err = ensure_transition(RequestStatus::Returned, RequestStatus::Returned);
        assert!(matches!(err, Err(ServiceError::InvalidState(_))));
    }

    #[test]
    fn transition_guard_requires_pending_return_before_returned() {
        let err = ensure_transition(RequestStatus::Approved, RequestStatus::Returned);
        assert!(matches!(err, Err(ServiceError::InvalidState(_))));
        assert!(ensure_transition(RequestStatus::PendingReturn, RequestStatus::Returned).is_ok());
    }
}
