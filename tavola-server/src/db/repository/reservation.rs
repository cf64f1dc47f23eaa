//! Reservation Repository
//!
//! Create and update run the table check and the write in one transaction.
//! The partial unique index `uq_reservations_table_slot` catches the race
//! where two requests pass the check at the same time.

use super::{RepoError, RepoResult, dining_table};
use crate::reservations::pick_table;
use chrono::NaiveDate;
use shared::error::ErrorCode;
use shared::models::{DiningTable, Reservation, ReservationStatus};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashSet;

const RESERVATION_COLUMNS: &str = "id, user_id, customer_name, customer_phone, customer_email, party_size, date, time, table_id, status, special_requests, created_at, updated_at";

/// List filter; `user_id` restricts to one owner
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub user_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub status: Option<ReservationStatus>,
}

/// Validated booking request
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub party_size: i32,
    pub date: NaiveDate,
    /// Canonical slot label (`HH:MM`)
    pub time: String,
    pub table_id: Option<i64>,
    pub special_requests: Option<String>,
}

pub async fn find_all(pool: &SqlitePool, filter: &ReservationFilter) -> RepoResult<Vec<Reservation>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE 1 = 1"
    ));
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(date) = filter.date {
        qb.push(" AND date = ").push_bind(date.to_string());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY date, time, created_at");

    let reservations: Vec<Reservation> = qb.build_query_as().fetch_all(pool).await?;
    Ok(reservations)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Reservation>> {
    let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?");
    let reservation = sqlx::query_as::<_, Reservation>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(reservation)
}

/// `(table_id, time)` of every table-holding reservation on `date`
pub async fn find_bookings_on(pool: &SqlitePool, date: NaiveDate) -> RepoResult<Vec<(i64, String)>> {
    let rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT table_id, time FROM reservations WHERE date = ? AND status NOT IN ('CANCELLED', 'NO_SHOW')",
    )
    .bind(date.to_string())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Tables held at one slot, ignoring reservation `exclude_id`
async fn booked_tables_at(
    conn: &mut SqliteConnection,
    date: &str,
    time: &str,
    exclude_id: Option<i64>,
) -> RepoResult<HashSet<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT table_id FROM reservations WHERE date = ?1 AND time = ?2 AND status NOT IN ('CANCELLED', 'NO_SHOW') AND (?3 IS NULL OR id != ?3)",
    )
    .bind(date)
    .bind(time)
    .bind(exclude_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(ids.into_iter().collect())
}

/// A specific table was requested: it must exist, be bookable, fit and be free
fn check_requested_table(
    tables: &[DiningTable],
    all_exists: bool,
    table_id: i64,
    booked: &HashSet<i64>,
    party_size: i32,
) -> RepoResult<i64> {
    let Some(table) = tables.iter().find(|t| t.id == table_id) else {
        return Err(if all_exists {
            RepoError::business(ErrorCode::TableInactive)
        } else {
            RepoError::business(ErrorCode::TableNotFound)
        });
    };
    if table.capacity < party_size {
        return Err(RepoError::Business(
            ErrorCode::TableCapacityExceeded,
            format!(
                "Table {} seats {}, party size is {}",
                table.number, table.capacity, party_size
            ),
        ));
    }
    if booked.contains(&table.id) {
        return Err(RepoError::business(ErrorCode::ReservationConflict));
    }
    Ok(table.id)
}

async fn table_exists(conn: &mut SqliteConnection, table_id: i64) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM dining_tables WHERE id = ?")
        .bind(table_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}

fn slot_conflict(err: sqlx::Error) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::business(ErrorCode::ReservationConflict),
        other => other,
    }
}

/// Book a table, auto-assigning the smallest free fitting one if none given
pub async fn create(pool: &SqlitePool, data: NewReservation) -> RepoResult<Reservation> {
    let date = data.date.to_string();
    let mut tx = super::begin_immediate(pool).await?;

    let tables = dining_table::find_bookable(&mut tx).await?;
    let booked = booked_tables_at(&mut tx, &date, &data.time, None).await?;

    let table_id = match data.table_id {
        Some(requested) => {
            let exists = table_exists(&mut tx, requested).await?;
            check_requested_table(&tables, exists, requested, &booked, data.party_size)?
        }
        None => pick_table(&tables, &booked, data.party_size)
            .map(|t| t.id)
            .ok_or_else(|| RepoError::business(ErrorCode::NoTableAvailable))?,
    };

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO reservations (id, user_id, customer_name, customer_phone, customer_email, party_size, date, time, table_id, status, special_requests, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'PENDING', ?10, ?11, ?11)",
    )
    .bind(id)
    .bind(data.user_id)
    .bind(&data.customer_name)
    .bind(&data.customer_phone)
    .bind(&data.customer_email)
    .bind(data.party_size)
    .bind(&date)
    .bind(&data.time)
    .bind(table_id)
    .bind(&data.special_requests)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(slot_conflict)?;

    tx.commit().await?;

    tracing::info!(reservation_id = id, table_id, date = %date, time = %data.time, party_size = data.party_size, "Reservation created");

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create reservation".into()))
}

/// Fully merged replacement values for an existing reservation
#[derive(Debug, Clone)]
pub struct ReservationChanges {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub party_size: i32,
    pub date: NaiveDate,
    pub time: String,
    /// Explicitly requested table; `None` keeps the current one if it still works
    pub table_id: Option<i64>,
    pub special_requests: Option<String>,
}

/// Re-run the table checks against the new values, excluding this reservation
pub async fn update(
    pool: &SqlitePool,
    current: &Reservation,
    changes: ReservationChanges,
) -> RepoResult<Reservation> {
    let date = changes.date.to_string();
    let mut tx = super::begin_immediate(pool).await?;

    let tables = dining_table::find_bookable(&mut tx).await?;
    let booked = booked_tables_at(&mut tx, &date, &changes.time, Some(current.id)).await?;

    let table_id = match changes.table_id {
        Some(requested) => {
            let exists = table_exists(&mut tx, requested).await?;
            check_requested_table(&tables, exists, requested, &booked, changes.party_size)?
        }
        None => {
            let keeps_current = tables.iter().any(|t| {
                t.id == current.table_id
                    && t.capacity >= changes.party_size
                    && !booked.contains(&t.id)
            });
            if keeps_current {
                current.table_id
            } else {
                pick_table(&tables, &booked, changes.party_size)
                    .map(|t| t.id)
                    .ok_or_else(|| RepoError::business(ErrorCode::NoTableAvailable))?
            }
        }
    };

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE reservations SET customer_name = ?1, customer_phone = ?2, customer_email = ?3, party_size = ?4, date = ?5, time = ?6, table_id = ?7, special_requests = ?8, updated_at = ?9 WHERE id = ?10",
    )
    .bind(&changes.customer_name)
    .bind(&changes.customer_phone)
    .bind(&changes.customer_email)
    .bind(changes.party_size)
    .bind(&date)
    .bind(&changes.time)
    .bind(table_id)
    .bind(&changes.special_requests)
    .bind(now)
    .bind(current.id)
    .execute(&mut *tx)
    .await
    .map_err(slot_conflict)?;

    tx.commit().await?;

    find_by_id(pool, current.id)
        .await?
        .ok_or_else(|| RepoError::business(ErrorCode::ReservationNotFound))
}

/// Any status may be set. Re-activating a cancelled booking whose slot has
/// been taken again fails on the slot index.
pub async fn set_status(
    pool: &SqlitePool,
    id: i64,
    status: ReservationStatus,
) -> RepoResult<Reservation> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE reservations SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .map_err(slot_conflict)?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::business(ErrorCode::ReservationNotFound));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::business(ErrorCode::ReservationNotFound))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM reservations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

