//! Cart API Handlers

use axum::{extract::State, http::StatusCode};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{menu_item, order};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, Json, Path};
use shared::error::ErrorCode;
use shared::models::{CartCheckout, CartItem, CartItemAdd, CartItemUpdate, CartView, Order, OrderItemInput};

/// GET /api/cart
pub async fn get(State(state): State<ServerState>, current: CurrentUser) -> Json<CartView> {
    Json(state.carts.get(current.id))
}

/// POST /api/cart/items - 加入购物车 (同一菜品合并数量)
pub async fn add_item(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<CartItemAdd>,
) -> AppResult<Json<CartView>> {
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let item = menu_item::find_by_id(&state.pool, payload.menu_item_id)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::MenuItemNotFound).with_detail("id", payload.menu_item_id)
        })?;
    if !item.is_available {
        return Err(AppError::new(ErrorCode::MenuItemUnavailable).with_detail("id", item.id));
    }

    let view = state.carts.add_item(
        current.id,
        CartItem {
            menu_item_id: item.id,
            name: item.name,
            unit_price: item.price,
            quantity: payload.quantity,
            note: payload.note,
        },
    )?;
    Ok(Json(view))
}

/// PUT /api/cart/items/{menu_item_id} - 修改数量 (0 = 移除)
pub async fn update_item(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(menu_item_id): Path<i64>,
    Json(payload): Json<CartItemUpdate>,
) -> AppResult<Json<CartView>> {
    let view = state
        .carts
        .set_quantity(current.id, menu_item_id, payload.quantity)?;
    Ok(Json(view))
}

/// DELETE /api/cart/items/{menu_item_id}
pub async fn remove_item(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(menu_item_id): Path<i64>,
) -> AppResult<Json<CartView>> {
    Ok(Json(state.carts.remove_item(current.id, menu_item_id)?))
}

/// DELETE /api/cart - 清空购物车
pub async fn clear(State(state): State<ServerState>, current: CurrentUser) -> StatusCode {
    state.carts.clear(current.id);
    StatusCode::NO_CONTENT
}

/// POST /api/cart/checkout - 结算
///
/// Lines are re-priced from the menu by the order module. The checked-out
/// lines leave the cart only once the order is stored.
pub async fn checkout(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<CartCheckout>,
) -> AppResult<(StatusCode, Json<Order>)> {
    validate_optional_text(&payload.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let lines = state.carts.items(current.id);
    if lines.is_empty() {
        return Err(AppError::with_message(ErrorCode::OrderEmpty, "Cart is empty"));
    }

    let items = lines
        .iter()
        .map(|line| OrderItemInput {
            menu_item_id: line.menu_item_id,
            quantity: line.quantity,
            note: line.note.clone(),
        })
        .collect();

    let created = order::create(
        &state.pool,
        order::NewOrder {
            user_id: current.id,
            table_id: payload.table_id,
            customer_name: payload.customer_name,
            order_type: payload.order_type,
            items,
            note: payload.note,
        },
    )
    .await?;

    state.carts.remove_checked_out(current.id, &lines);
    tracing::info!(order_id = created.id, user_id = current.id, "Cart checked out");
    Ok((StatusCode::CREATED, Json(created)))
}
