//! Shift API Handlers

use axum::{extract::State, http::StatusCode};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::shift::{self, ShiftValues};
use crate::utils::validation::{MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, Json, Path, Query};
use shared::error::ErrorCode;
use shared::models::{Shift, ShiftCreate, ShiftQuery, ShiftUpdate};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::ShiftNotFound).with_detail("id", id)
}

fn validate_text(position: &Option<String>, note: &Option<String>) -> AppResult<()> {
    validate_optional_text(position, "position", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(note, "note", MAX_NOTE_LEN)?;
    Ok(())
}

/// GET /api/shifts - 排班列表 (user_id / from / to)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ShiftQuery>,
) -> AppResult<Json<Vec<Shift>>> {
    Ok(Json(shift::find_all(&state.pool, &query).await?))
}

/// GET /api/shifts/me - 我的排班
pub async fn mine(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<ShiftQuery>,
) -> AppResult<Json<Vec<Shift>>> {
    let query = ShiftQuery {
        user_id: Some(current.id),
        ..query
    };
    Ok(Json(shift::find_all(&state.pool, &query).await?))
}

/// GET /api/shifts/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Shift>> {
    let found = shift::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(found))
}

/// POST /api/shifts - 新建排班
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ShiftCreate>,
) -> AppResult<(StatusCode, Json<Shift>)> {
    validate_text(&payload.position, &payload.note)?;

    let created = shift::create(
        &state.pool,
        ShiftValues {
            user_id: payload.user_id,
            position: payload.position,
            start_time: payload.start_time,
            end_time: payload.end_time,
            note: payload.note,
        },
    )
    .await?;
    tracing::info!(shift_id = created.id, user_id = created.user_id, "Shift created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/shifts/{id} - 修改排班
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ShiftUpdate>,
) -> AppResult<Json<Shift>> {
    validate_text(&payload.position, &payload.note)?;
    let existing = shift::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let values = ShiftValues {
        user_id: payload.user_id.unwrap_or(existing.user_id),
        position: payload.position.or(existing.position),
        start_time: payload.start_time.unwrap_or(existing.start_time),
        end_time: payload.end_time.unwrap_or(existing.end_time),
        note: payload.note.or(existing.note),
    };
    Ok(Json(shift::update(&state.pool, id, values).await?))
}

/// DELETE /api/shifts/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !shift::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
