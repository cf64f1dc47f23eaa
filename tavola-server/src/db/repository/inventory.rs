//! Inventory Repository

use super::{RepoError, RepoResult, map_duplicate};
use shared::error::ErrorCode;
use shared::models::{InventoryItem, InventoryItemCreate, InventoryItemUpdate};
use sqlx::SqlitePool;

const INVENTORY_SELECT: &str = "SELECT id, name, category, quantity, unit, reorder_level, cost_per_unit, supplier, updated_at FROM inventory_items";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<InventoryItem>> {
    let sql = format!("{INVENTORY_SELECT} ORDER BY category, name");
    let items = sqlx::query_as::<_, InventoryItem>(&sql).fetch_all(pool).await?;
    Ok(items)
}

/// Items at or below their reorder level
pub async fn find_low_stock(pool: &SqlitePool) -> RepoResult<Vec<InventoryItem>> {
    let sql = format!("{INVENTORY_SELECT} WHERE quantity <= reorder_level ORDER BY name");
    let items = sqlx::query_as::<_, InventoryItem>(&sql).fetch_all(pool).await?;
    Ok(items)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<InventoryItem>> {
    let sql = format!("{INVENTORY_SELECT} WHERE id = ?");
    let item = sqlx::query_as::<_, InventoryItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(item)
}

pub async fn create(pool: &SqlitePool, data: InventoryItemCreate) -> RepoResult<InventoryItem> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO inventory_items (id, name, category, quantity, unit, reorder_level, cost_per_unit, supplier, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.category)
    .bind(data.quantity)
    .bind(&data.unit)
    .bind(data.reorder_level)
    .bind(data.cost_per_unit)
    .bind(&data.supplier)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| map_duplicate(e.into(), ErrorCode::InventoryNameExists))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create inventory item".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: InventoryItemUpdate,
) -> RepoResult<InventoryItem> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE inventory_items SET name = COALESCE(?1, name), category = COALESCE(?2, category), quantity = COALESCE(?3, quantity), unit = COALESCE(?4, unit), reorder_level = COALESCE(?5, reorder_level), cost_per_unit = COALESCE(?6, cost_per_unit), supplier = COALESCE(?7, supplier), updated_at = ?8 WHERE id = ?9",
    )
    .bind(data.name)
    .bind(data.category)
    .bind(data.quantity)
    .bind(data.unit)
    .bind(data.reorder_level)
    .bind(data.cost_per_unit)
    .bind(data.supplier)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| map_duplicate(e.into(), ErrorCode::InventoryNameExists))?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::business(ErrorCode::InventoryItemNotFound));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::business(ErrorCode::InventoryItemNotFound))
}

/// Apply `delta` in a single statement; the guard keeps quantity >= 0
pub async fn adjust(pool: &SqlitePool, id: i64, delta: f64) -> RepoResult<InventoryItem> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE inventory_items SET quantity = ROUND(quantity + ?1, 4), updated_at = ?2 WHERE id = ?3 AND ROUND(quantity + ?1, 4) >= 0",
    )
    .bind(delta)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return match find_by_id(pool, id).await? {
            Some(item) => Err(RepoError::Business(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: have {} {}, change {}",
                    item.name, item.quantity, item.unit, delta
                ),
            )),
            None => Err(RepoError::business(ErrorCode::InventoryItemNotFound)),
        };
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::business(ErrorCode::InventoryItemNotFound))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
