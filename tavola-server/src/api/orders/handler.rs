//! Order API Handlers

use axum::{extract::State, http::StatusCode};

use crate::auth::{CurrentUser, permissions};
use crate::core::ServerState;
use crate::db::repository::order::{self, NewOrder};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, Json, Path, Query};
use shared::error::ErrorCode;
use shared::models::{Order, OrderCreate, OrderQuery, OrderStatus, OrderStatusUpdate};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::OrderNotFound).with_detail("id", id)
}

async fn load(state: &ServerState, id: i64) -> AppResult<Order> {
    order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// GET /api/orders - 订单列表
///
/// Without `orders:read_all` only the caller's own orders are listed.
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let owner = (!current.has_permission(permissions::ORDERS_READ_ALL)).then_some(current.id);
    Ok(Json(order::find_all(&state.pool, owner, &query).await?))
}

/// GET /api/orders/kitchen - 后厨队列 (PENDING + PREPARING)
pub async fn kitchen_queue(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(order::find_kitchen_queue(&state.pool).await?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let found = load(&state, id).await?;
    if found.user_id != current.id && !current.has_permission(permissions::ORDERS_READ_ALL) {
        return Err(AppError::forbidden("Not your order"));
    }
    Ok(Json(found))
}

/// POST /api/orders - 下单
///
/// Prices are taken from the menu; the client only sends ids and quantities.
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    validate_optional_text(&payload.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    for item in &payload.items {
        validate_optional_text(&item.note, "items.note", MAX_NOTE_LEN)?;
    }

    let created = order::create(
        &state.pool,
        NewOrder {
            user_id: current.id,
            table_id: payload.table_id,
            customer_name: payload.customer_name,
            order_type: payload.order_type,
            items: payload.items,
            note: payload.note,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/orders/{id}/status - 修改订单状态
pub async fn set_status(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let updated = order::set_status(&state.pool, id, payload.status).await?;
    tracing::info!(order_id = id, status = ?updated.status, operator = current.id, "Order status changed");
    Ok(Json(updated))
}

/// POST /api/orders/{id}/cancel - 取消订单
///
/// Owners may cancel only while the order is still `PENDING`.
pub async fn cancel(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let found = load(&state, id).await?;
    if !current.is_staff() {
        if found.user_id != current.id {
            return Err(AppError::forbidden("Not your order"));
        }
        if found.status != OrderStatus::Pending {
            return Err(AppError::new(ErrorCode::OrderNotCancellable)
                .with_detail("status", format!("{:?}", found.status)));
        }
    }

    let updated = order::set_status(&state.pool, id, OrderStatus::Cancelled).await?;
    tracing::info!(order_id = id, cancelled_by = current.id, "Order cancelled");
    Ok(Json(updated))
}

/// DELETE /api/orders/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !order::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
