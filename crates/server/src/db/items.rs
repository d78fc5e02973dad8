//! Database operations for inventory items, including the stock ledger.
//!
//! `inventory_items.quantity` is the authoritative availability counter.
//! [`reserve_stock`] and [`release_stock`] are the only two mutations the
//! request/job workflows may apply to it, and both are single atomic
//! statements: concurrent callers are serialized by the row update itself,
//! never by an in-process lock.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;

use crewdesk_core::{InventoryItemId, ItemType};

use super::{RepositoryError, map_constraint};

/// Error from a stock-ledger operation.
#[derive(Debug, Error)]
pub enum StockError {
    /// The item does not exist or holds less stock than requested.
    #[error("insufficient stock available")]
    InsufficientStock,

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// An inventory item row.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub name: String,
    pub quantity: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub last_restock_date: Option<NaiveDate>,
}

/// Parameters for creating an inventory item.
#[derive(Debug)]
pub struct CreateItem {
    pub name: String,
    pub quantity: i32,
    pub item_type: ItemType,
}

/// Parameters for updating an inventory item. `None` fields are left
/// unchanged; a quantity update also stamps `last_restock_date`.
#[derive(Debug, Default)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub quantity: Option<i32>,
}

// =============================================================================
// Stock ledger
// =============================================================================

/// Reserve `amount` units of an item: atomically decrement its quantity.
///
/// The conditional `WHERE quantity >= $amount` makes the availability
/// check and the decrement one statement; the affected-row count is the
/// success signal. Zero rows means the item is missing or short on
/// stock, and nothing was changed.
///
/// Must run inside the same transaction as the write that records why
/// the stock was taken (e.g. the request-row insert), so a failure
/// between the two leaves no orphaned reservation.
///
/// # Errors
///
/// Returns [`StockError::InsufficientStock`] when the item does not
/// exist or holds less than `amount`.
pub async fn reserve_stock(
    conn: &mut PgConnection,
    item_id: InventoryItemId,
    amount: i32,
) -> Result<(), StockError> {
    let result = sqlx::query(
        r"
        UPDATE inventory_items
        SET quantity = quantity - $2
        WHERE id = $1 AND quantity >= $2
        ",
    )
    .bind(item_id)
    .bind(amount)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StockError::InsufficientStock);
    }

    Ok(())
}

/// Release `amount` units back to an item: atomically increment its
/// quantity.
///
/// Performs no deduplication; the caller is responsible for releasing a
/// given reservation exactly once.
///
/// # Errors
///
/// Returns [`StockError::Database`] if the update fails.
pub async fn release_stock(
    conn: &mut PgConnection,
    item_id: InventoryItemId,
    amount: i32,
) -> Result<(), StockError> {
    sqlx::query(
        r"
        UPDATE inventory_items
        SET quantity = quantity + $2
        WHERE id = $1
        ",
    )
    .bind(item_id)
    .bind(amount)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Item CRUD
// =============================================================================

/// List all inventory items, alphabetically.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_items(pool: &PgPool) -> Result<Vec<InventoryItem>, RepositoryError> {
    let items = sqlx::query_as::<_, InventoryItem>(
        r"
        SELECT id, name, quantity, type, last_restock_date
        FROM inventory_items
        ORDER BY name ASC
        ",
    )
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Create a new inventory item. Stamps `last_restock_date` with today.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if an item with the same name
/// already exists.
pub async fn create_item(
    pool: &PgPool,
    params: &CreateItem,
) -> Result<InventoryItem, RepositoryError> {
    let item = sqlx::query_as::<_, InventoryItem>(
        r"
        INSERT INTO inventory_items (name, quantity, type, last_restock_date)
        VALUES ($1, $2, $3, CURRENT_DATE)
        RETURNING id, name, quantity, type, last_restock_date
        ",
    )
    .bind(&params.name)
    .bind(params.quantity)
    .bind(params.item_type)
    .fetch_one(pool)
    .await
    .map_err(|e| map_constraint(e, "inventory_items_name_key", "item name already exists"))?;

    Ok(item)
}

/// Update an item's name and/or quantity. A quantity change also stamps
/// `last_restock_date` with today (a manual restock by an admin).
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the item doesn't exist.
pub async fn update_item(
    pool: &PgPool,
    id: InventoryItemId,
    params: &UpdateItem,
) -> Result<InventoryItem, RepositoryError> {
    let item = sqlx::query_as::<_, InventoryItem>(
        r"
        UPDATE inventory_items
        SET
            name = COALESCE($2, name),
            quantity = COALESCE($3, quantity),
            last_restock_date = CASE WHEN $3 IS NULL THEN last_restock_date ELSE CURRENT_DATE END
        WHERE id = $1
        RETURNING id, name, quantity, type, last_restock_date
        ",
    )
    .bind(id)
    .bind(&params.name)
    .bind(params.quantity)
    .fetch_optional(pool)
    .await
    .map_err(|e| map_constraint(e, "inventory_items_name_key", "item name already exists"))?
    .ok_or(RepositoryError::NotFound)?;

    Ok(item)
}

/// Change an item's type (consumable vs reusable).
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the item doesn't exist.
pub async fn update_item_type(
    pool: &PgPool,
    id: InventoryItemId,
    item_type: ItemType,
) -> Result<InventoryItem, RepositoryError> {
    let item = sqlx::query_as::<_, InventoryItem>(
        r"
        UPDATE inventory_items
        SET type = $2
        WHERE id = $1
        RETURNING id, name, quantity, type, last_restock_date
        ",
    )
    .bind(id)
    .bind(item_type)
    .fetch_optional(pool)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(item)
}

/// Delete an inventory item.
///
/// # Returns
///
/// Returns `true` if the item was deleted, `false` if it didn't exist.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if requests still reference the
/// item (RESTRICT foreign key).
pub async fn delete_item(pool: &PgPool, id: InventoryItemId) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        DELETE FROM inventory_items
        WHERE id = $1
        ",
    )
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| {
        map_constraint(
            e,
            "inventory_requests_item_id_fkey",
            "item has requests and cannot be deleted",
        )
    })?;

    Ok(result.rows_affected() > 0)
}
