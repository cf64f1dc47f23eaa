//! Inventory API Handlers

use axum::{extract::State, http::StatusCode};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::inventory;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_amount, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, Json, Path};
use shared::error::ErrorCode;
use shared::models::{InventoryAdjust, InventoryItem, InventoryItemCreate, InventoryItemUpdate};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::InventoryItemNotFound).with_detail("id", id)
}

/// GET /api/inventory - 库存列表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<InventoryItem>>> {
    Ok(Json(inventory::find_all(&state.pool).await?))
}

/// GET /api/inventory/low-stock - quantity <= reorder_level
pub async fn low_stock(State(state): State<ServerState>) -> AppResult<Json<Vec<InventoryItem>>> {
    Ok(Json(inventory::find_low_stock(&state.pool).await?))
}

/// GET /api/inventory/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<InventoryItem>> {
    let item = inventory::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(item))
}

/// POST /api/inventory - 新增库存项
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<InventoryItemCreate>,
) -> AppResult<(StatusCode, Json<InventoryItem>)> {
    payload.name = payload.name.trim().to_string();
    payload.unit = payload.unit.trim().to_string();
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.unit, "unit", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.supplier, "supplier", MAX_NAME_LEN)?;
    validate_amount(payload.quantity, "quantity")?;
    validate_amount(payload.reorder_level, "reorder_level")?;
    if let Some(cost) = payload.cost_per_unit {
        validate_amount(cost, "cost_per_unit")?;
    }

    let item = inventory::create(&state.pool, payload).await?;
    tracing::info!(inventory_id = item.id, name = %item.name, "Inventory item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/inventory/{id} - 更新库存项
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<InventoryItemUpdate>,
) -> AppResult<Json<InventoryItem>> {
    if let Some(name) = payload.name.as_mut() {
        *name = name.trim().to_string();
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(unit) = payload.unit.as_mut() {
        *unit = unit.trim().to_string();
        validate_required_text(unit, "unit", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.supplier, "supplier", MAX_NAME_LEN)?;
    for (value, field) in [
        (payload.quantity, "quantity"),
        (payload.reorder_level, "reorder_level"),
        (payload.cost_per_unit, "cost_per_unit"),
    ] {
        if let Some(v) = value {
            validate_amount(v, field)?;
        }
    }

    Ok(Json(inventory::update(&state.pool, id, payload).await?))
}

/// PATCH /api/inventory/{id}/adjust - 出入库 (delta 可为负)
pub async fn adjust(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<InventoryAdjust>,
) -> AppResult<Json<InventoryItem>> {
    if !payload.delta.is_finite() {
        return Err(AppError::validation("delta must be a finite number").with_detail("field", "delta"));
    }
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;

    let item = inventory::adjust(&state.pool, id, payload.delta).await?;
    tracing::info!(
        inventory_id = id,
        delta = payload.delta,
        quantity = item.quantity,
        reason = payload.reason.as_deref().unwrap_or(""),
        operator = current.id,
        "Inventory adjusted"
    );
    if item.is_low_stock() {
        tracing::warn!(
            inventory_id = id,
            name = %item.name,
            quantity = item.quantity,
            reorder_level = item.reorder_level,
            "Stock at or below reorder level"
        );
    }
    Ok(Json(item))
}

/// DELETE /api/inventory/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !inventory::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
