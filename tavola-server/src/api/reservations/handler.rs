//! Reservation API Handlers

use axum::{extract::State, http::StatusCode};
use chrono::NaiveDate;

use crate::auth::{CurrentUser, permissions};
use crate::core::ServerState;
use crate::db::repository::reservation::{self, NewReservation, ReservationChanges, ReservationFilter};
use crate::db::repository::{RepoError, dining_table, user};
use crate::reservations::{compute_availability, ensure_not_past, normalize_slot, validate_party_size};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, Json, Path, Query};
use shared::error::ErrorCode;
use shared::models::{
    AvailabilityQuery, Reservation, ReservationCreate, ReservationQuery, ReservationStatus,
    ReservationStatusUpdate, ReservationUpdate, TimeSlot,
};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::ReservationNotFound).with_detail("id", id)
}

fn is_owner(reservation: &Reservation, current: &CurrentUser) -> bool {
    reservation.user_id == Some(current.id)
}

async fn load(state: &ServerState, id: i64) -> AppResult<Reservation> {
    reservation::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Owner or staff; anyone else gets 403
async fn load_visible(state: &ServerState, id: i64, current: &CurrentUser) -> AppResult<Reservation> {
    let found = load(state, id).await?;
    if !is_owner(&found, current) && !current.is_staff() {
        return Err(AppError::forbidden("Not your reservation"));
    }
    Ok(found)
}

fn validate_contact(
    name: &str,
    phone: &Option<String>,
    email: &Option<String>,
    special_requests: &Option<String>,
) -> AppResult<()> {
    validate_required_text(name, "customer_name", MAX_NAME_LEN)?;
    validate_optional_text(phone, "customer_phone", MAX_SHORT_TEXT_LEN)?;
    validate_email(email)?;
    validate_optional_text(special_requests, "special_requests", MAX_NOTE_LEN)?;
    Ok(())
}

/// GET /api/reservations/availability?date&party_size - 时段可用性 (公开)
pub async fn availability(
    State(state): State<ServerState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<TimeSlot>>> {
    validate_party_size(query.party_size)?;
    ensure_not_past(query.date, shared::util::today())?;

    let tables = {
        let mut conn = state.pool.acquire().await.map_err(RepoError::from)?;
        dining_table::find_bookable(&mut conn).await?
    };
    let bookings = reservation::find_bookings_on(&state.pool, query.date).await?;

    Ok(Json(compute_availability(&tables, &bookings, query.party_size)))
}

/// GET /api/reservations - 预订列表
///
/// Without `reservations:read_all` only the caller's own bookings are listed.
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<Vec<Reservation>>> {
    let filter = ReservationFilter {
        user_id: (!current.has_permission(permissions::RESERVATIONS_READ_ALL)).then_some(current.id),
        date: query.date,
        status: query.status,
    };
    Ok(Json(reservation::find_all(&state.pool, &filter).await?))
}

/// GET /api/reservations/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    Ok(Json(load_visible(&state, id, &current).await?))
}

/// POST /api/reservations - 创建预订
///
/// Customers book for themselves and their profile fills missing contact
/// fields. Staff book on behalf of a guest and must give a name.
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ReservationCreate>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    validate_party_size(payload.party_size)?;
    let time = normalize_slot(&payload.time)?;
    ensure_not_past(payload.date, shared::util::today())?;

    let booking_user = if current.is_staff() {
        None
    } else {
        Some(
            user::find_by_id(&state.pool, current.id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?,
        )
    };

    let customer_name = payload
        .customer_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .or_else(|| booking_user.as_ref().map(|u| u.display_name.clone()))
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::RequiredField, "customer_name is required")
                .with_detail("field", "customer_name")
        })?;
    let customer_phone = payload
        .customer_phone
        .or_else(|| booking_user.as_ref().and_then(|u| u.phone.clone()));
    let customer_email = payload
        .customer_email
        .or_else(|| booking_user.as_ref().and_then(|u| u.email.clone()));
    validate_contact(
        &customer_name,
        &customer_phone,
        &customer_email,
        &payload.special_requests,
    )?;

    let created = reservation::create(
        &state.pool,
        NewReservation {
            user_id: booking_user.map(|u| u.id),
            customer_name,
            customer_phone,
            customer_email,
            party_size: payload.party_size,
            date: payload.date,
            time,
            table_id: payload.table_id,
            special_requests: payload.special_requests,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/reservations/{id} - 修改预订
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReservationUpdate>,
) -> AppResult<Json<Reservation>> {
    let existing = load_visible(&state, id, &current).await?;
    if !current.is_staff() && !existing.status.editable_by_owner() {
        return Err(AppError::new(ErrorCode::ReservationNotEditable)
            .with_detail("status", format!("{:?}", existing.status)));
    }

    let current_date = NaiveDate::parse_from_str(&existing.date, "%Y-%m-%d")
        .map_err(|e| AppError::internal(format!("Stored reservation date is invalid: {e}")))?;

    let party_size = payload.party_size.unwrap_or(existing.party_size);
    validate_party_size(party_size)?;
    let date = payload.date.unwrap_or(current_date);
    let time = match payload.time.as_deref() {
        Some(t) => normalize_slot(t)?,
        None => existing.time.clone(),
    };
    if date != current_date || time != existing.time {
        ensure_not_past(date, shared::util::today())?;
    }

    let changes = ReservationChanges {
        customer_name: payload
            .customer_name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| existing.customer_name.clone()),
        customer_phone: payload.customer_phone.or_else(|| existing.customer_phone.clone()),
        customer_email: payload.customer_email.or_else(|| existing.customer_email.clone()),
        party_size,
        date,
        time,
        table_id: payload.table_id,
        special_requests: payload
            .special_requests
            .or_else(|| existing.special_requests.clone()),
    };
    validate_contact(
        &changes.customer_name,
        &changes.customer_phone,
        &changes.customer_email,
        &changes.special_requests,
    )?;

    let updated = reservation::update(&state.pool, &existing, changes).await?;
    tracing::info!(reservation_id = id, table_id = updated.table_id, "Reservation updated");
    Ok(Json(updated))
}

/// PATCH /api/reservations/{id}/status - 修改状态 (任意状态)
pub async fn set_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReservationStatusUpdate>,
) -> AppResult<Json<Reservation>> {
    let updated = reservation::set_status(&state.pool, id, payload.status).await?;
    tracing::info!(reservation_id = id, status = ?updated.status, "Reservation status changed");
    Ok(Json(updated))
}

/// POST /api/reservations/{id}/cancel - 取消预订
pub async fn cancel(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let existing = load_visible(&state, id, &current).await?;
    if !current.is_staff() && !existing.status.editable_by_owner() {
        return Err(AppError::new(ErrorCode::ReservationNotEditable)
            .with_detail("status", format!("{:?}", existing.status)));
    }

    let updated = reservation::set_status(&state.pool, id, ReservationStatus::Cancelled).await?;
    tracing::info!(reservation_id = id, cancelled_by = current.id, "Reservation cancelled");
    Ok(Json(updated))
}

/// DELETE /api/reservations/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !reservation::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
