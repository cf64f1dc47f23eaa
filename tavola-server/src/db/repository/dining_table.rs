//! Dining Table Repository

use super::{RepoError, RepoResult, map_duplicate};
use shared::error::ErrorCode;
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};
use sqlx::{SqliteConnection, SqlitePool};

const TABLE_SELECT: &str = "SELECT id, number, capacity, location, status, is_active FROM dining_tables";

pub async fn find_all(pool: &SqlitePool, status: Option<TableStatus>) -> RepoResult<Vec<DiningTable>> {
    let tables = match status {
        Some(status) => {
            let sql = format!("{TABLE_SELECT} WHERE status = ? ORDER BY number");
            sqlx::query_as::<_, DiningTable>(&sql)
                .bind(status)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("{TABLE_SELECT} ORDER BY number");
            sqlx::query_as::<_, DiningTable>(&sql).fetch_all(pool).await?
        }
    };
    Ok(tables)
}

/// Active, in-service tables, smallest first
pub async fn find_bookable(conn: &mut SqliteConnection) -> RepoResult<Vec<DiningTable>> {
    let sql = format!(
        "{TABLE_SELECT} WHERE is_active = 1 AND status != 'OUT_OF_SERVICE' ORDER BY capacity, number"
    );
    let tables = sqlx::query_as::<_, DiningTable>(&sql)
        .fetch_all(&mut *conn)
        .await?;
    Ok(tables)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DiningTable>> {
    let sql = format!("{TABLE_SELECT} WHERE id = ?");
    let table = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(table)
}

pub async fn create(pool: &SqlitePool, data: DiningTableCreate) -> RepoResult<DiningTable> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO dining_tables (id, number, capacity, location, status, is_active) VALUES (?, ?, ?, ?, 'AVAILABLE', 1)",
    )
    .bind(id)
    .bind(data.number)
    .bind(data.capacity.unwrap_or(4))
    .bind(&data.location)
    .execute(pool)
    .await
    .map_err(|e| map_duplicate(e.into(), ErrorCode::TableNumberExists))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create table".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: DiningTableUpdate) -> RepoResult<DiningTable> {
    let rows = sqlx::query(
        "UPDATE dining_tables SET number = COALESCE(?1, number), capacity = COALESCE(?2, capacity), location = COALESCE(?3, location), status = COALESCE(?4, status), is_active = COALESCE(?5, is_active) WHERE id = ?6",
    )
    .bind(data.number)
    .bind(data.capacity)
    .bind(data.location)
    .bind(data.status)
    .bind(data.is_active)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| map_duplicate(e.into(), ErrorCode::TableNumberExists))?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::business(ErrorCode::TableNotFound));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::business(ErrorCode::TableNotFound))
}

pub async fn set_status(pool: &SqlitePool, id: i64, status: TableStatus) -> RepoResult<DiningTable> {
    let rows = sqlx::query("UPDATE dining_tables SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::business(ErrorCode::TableNotFound));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::business(ErrorCode::TableNotFound))
}

/// Tables referenced by any reservation cannot be removed
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let refs = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservations WHERE table_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if refs > 0 {
        return Err(RepoError::business(ErrorCode::TableHasReservations));
    }

    let result = sqlx::query("DELETE FROM dining_tables WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Conflict(_) => RepoError::business(ErrorCode::TableHasReservations),
            other => other,
        })?;
    Ok(result.rows_affected() > 0)
}
