//! Dietary Option Repository

use super::{RepoError, RepoResult, map_duplicate};
use shared::error::ErrorCode;
use shared::models::{DietaryOption, DietaryOptionCreate, DietaryOptionUpdate};
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DietaryOption>> {
    let options = sqlx::query_as::<_, DietaryOption>(
        "SELECT id, name, description FROM dietary_options ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(options)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DietaryOption>> {
    let option = sqlx::query_as::<_, DietaryOption>(
        "SELECT id, name, description FROM dietary_options WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(option)
}

pub async fn create(pool: &SqlitePool, data: DietaryOptionCreate) -> RepoResult<DietaryOption> {
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO dietary_options (id, name, description) VALUES (?, ?, ?)")
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .execute(pool)
        .await
        .map_err(|e| map_duplicate(e.into(), ErrorCode::DietaryOptionNameExists))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create dietary option".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: DietaryOptionUpdate,
) -> RepoResult<DietaryOption> {
    let rows = sqlx::query(
        "UPDATE dietary_options SET name = COALESCE(?1, name), description = COALESCE(?2, description) WHERE id = ?3",
    )
    .bind(data.name)
    .bind(data.description)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| map_duplicate(e.into(), ErrorCode::DietaryOptionNameExists))?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::business(ErrorCode::DietaryOptionNotFound));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::business(ErrorCode::DietaryOptionNotFound))
}

/// Links in `menu_item_dietary` go with it (ON DELETE CASCADE)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM dietary_options WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
