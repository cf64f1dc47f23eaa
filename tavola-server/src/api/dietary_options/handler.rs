//! Dietary Option API Handlers

use axum::{extract::State, http::StatusCode};

use crate::core::ServerState;
use crate::db::repository::dietary_option;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, Json, Path};
use shared::error::ErrorCode;
use shared::models::{DietaryOption, DietaryOptionCreate, DietaryOptionUpdate};

/// GET /api/dietary-options
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DietaryOption>>> {
    Ok(Json(dietary_option::find_all(&state.pool).await?))
}

/// POST /api/dietary-options
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<DietaryOptionCreate>,
) -> AppResult<(StatusCode, Json<DietaryOption>)> {
    payload.name = payload.name.trim().to_string();
    validate_required_text(&payload.name, "name", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let option = dietary_option::create(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(option)))
}

/// PUT /api/dietary-options/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<DietaryOptionUpdate>,
) -> AppResult<Json<DietaryOption>> {
    if let Some(name) = payload.name.as_mut() {
        *name = name.trim().to_string();
        validate_required_text(name, "name", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    Ok(Json(dietary_option::update(&state.pool, id, payload).await?))
}

/// DELETE /api/dietary-options/{id} - 同时移除与菜品的关联
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !dietary_option::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::DietaryOptionNotFound).with_detail("id", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
