//! Dining Table API Handlers

use axum::{extract::State, http::StatusCode};

use crate::core::ServerState;
use crate::db::repository::dining_table;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, Json, Path, Query};
use shared::error::ErrorCode;
use shared::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, MAX_PARTY_SIZE, TableQuery,
    TableStatusUpdate,
};

fn validate_capacity(capacity: i32) -> AppResult<()> {
    if !(1..=MAX_PARTY_SIZE).contains(&capacity) {
        return Err(AppError::new(ErrorCode::InvalidCapacity)
            .with_detail("capacity", capacity)
            .with_detail("max", MAX_PARTY_SIZE));
    }
    Ok(())
}

fn validate_number(number: i32) -> AppResult<()> {
    if number < 1 {
        return Err(AppError::validation("Table number must be at least 1")
            .with_detail("field", "number"));
    }
    Ok(())
}

/// GET /api/tables - 获取所有桌台
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TableQuery>,
) -> AppResult<Json<Vec<DiningTable>>> {
    Ok(Json(dining_table::find_all(&state.pool, query.status).await?))
}

/// GET /api/tables/{id} - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    let table = dining_table::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound).with_detail("id", id))?;
    Ok(Json(table))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<(StatusCode, Json<DiningTable>)> {
    validate_number(payload.number)?;
    if let Some(capacity) = payload.capacity {
        validate_capacity(capacity)?;
    }
    validate_optional_text(&payload.location, "location", MAX_SHORT_TEXT_LEN)?;

    let table = dining_table::create(&state.pool, payload).await?;
    tracing::info!(table_id = table.id, number = table.number, "Table created");
    Ok((StatusCode::CREATED, Json(table)))
}

/// PUT /api/tables/{id} - 更新桌台
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    if let Some(number) = payload.number {
        validate_number(number)?;
    }
    if let Some(capacity) = payload.capacity {
        validate_capacity(capacity)?;
    }
    validate_optional_text(&payload.location, "location", MAX_SHORT_TEXT_LEN)?;

    Ok(Json(dining_table::update(&state.pool, id, payload).await?))
}

/// PATCH /api/tables/{id}/status - 修改桌台状态
pub async fn set_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TableStatusUpdate>,
) -> AppResult<Json<DiningTable>> {
    let table = dining_table::set_status(&state.pool, id, payload.status).await?;
    tracing::info!(table_id = id, status = ?table.status, "Table status changed");
    Ok(Json(table))
}

/// DELETE /api/tables/{id} - 删除桌台 (有预订时拒绝)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !dining_table::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::TableNotFound).with_detail("id", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
