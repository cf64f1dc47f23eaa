//! Shift Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Shift, ShiftQuery};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const SHIFT_SELECT: &str = "SELECT s.id, s.user_id, u.display_name AS user_name, s.position, s.start_time, s.end_time, s.note, s.created_at, s.updated_at FROM shifts s JOIN users u ON u.id = s.user_id";

/// Fully resolved shift values
#[derive(Debug, Clone)]
pub struct ShiftValues {
    pub user_id: i64,
    pub position: Option<String>,
    pub start_time: i64,
    pub end_time: i64,
    pub note: Option<String>,
}

pub async fn find_all(pool: &SqlitePool, query: &ShiftQuery) -> RepoResult<Vec<Shift>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("{SHIFT_SELECT} WHERE 1 = 1"));
    if let Some(user_id) = query.user_id {
        qb.push(" AND s.user_id = ").push_bind(user_id);
    }
    if let Some(from) = query.from {
        qb.push(" AND s.start_time >= ").push_bind(from);
    }
    if let Some(to) = query.to {
        qb.push(" AND s.start_time < ").push_bind(to);
    }
    qb.push(" ORDER BY s.start_time");

    let shifts: Vec<Shift> = qb.build_query_as().fetch_all(pool).await?;
    Ok(shifts)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Shift>> {
    let sql = format!("{SHIFT_SELECT} WHERE s.id = ?");
    let shift = sqlx::query_as::<_, Shift>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(shift)
}

/// Any other shift of the same user intersecting `[start, end)`
async fn has_overlap(
    conn: &mut SqliteConnection,
    user_id: i64,
    start: i64,
    end: i64,
    exclude_id: Option<i64>,
) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM shifts WHERE user_id = ?1 AND start_time < ?3 AND end_time > ?2 AND (?4 IS NULL OR id != ?4)",
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count > 0)
}

/// Assignee must be active staff
async fn check_assignee(conn: &mut SqliteConnection, user_id: i64) -> RepoResult<()> {
    let row = sqlx::query_as::<_, (String, bool)>("SELECT role, is_active FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    match row {
        None => Err(RepoError::business(ErrorCode::UserNotFound)),
        Some((role, is_active)) if !is_active || role == "customer" => {
            Err(RepoError::business(ErrorCode::ShiftAssigneeInvalid))
        }
        Some(_) => Ok(()),
    }
}

/// Must run inside the write transaction
async fn check_rules(
    conn: &mut SqliteConnection,
    values: &ShiftValues,
    exclude_id: Option<i64>,
) -> RepoResult<()> {
    if values.end_time <= values.start_time {
        return Err(RepoError::business(ErrorCode::ShiftInvalidRange));
    }
    check_assignee(conn, values.user_id).await?;
    if has_overlap(conn, values.user_id, values.start_time, values.end_time, exclude_id).await? {
        return Err(RepoError::business(ErrorCode::ShiftOverlap));
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, values: ShiftValues) -> RepoResult<Shift> {
    let mut tx = super::begin_immediate(pool).await?;
    check_rules(&mut tx, &values, None).await?;

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO shifts (id, user_id, position, start_time, end_time, note, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(values.user_id)
    .bind(&values.position)
    .bind(values.start_time)
    .bind(values.end_time)
    .bind(&values.note)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create shift".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, values: ShiftValues) -> RepoResult<Shift> {
    let mut tx = super::begin_immediate(pool).await?;
    check_rules(&mut tx, &values, Some(id)).await?;

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE shifts SET user_id = ?1, position = ?2, start_time = ?3, end_time = ?4, note = ?5, updated_at = ?6 WHERE id = ?7",
    )
    .bind(values.user_id)
    .bind(&values.position)
    .bind(values.start_time)
    .bind(values.end_time)
    .bind(&values.note)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::business(ErrorCode::ShiftNotFound));
    }
    tx.commit().await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::business(ErrorCode::ShiftNotFound))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM shifts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
