//! Menu API Handlers

use axum::{extract::State, http::StatusCode};

use crate::core::ServerState;
use crate::db::repository::menu_item;
use crate::order_money::{round_money, validate_price};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_text,
    validate_range, validate_required_text,
};
use crate::utils::{AppError, AppResult, Json, Path, Query};
use shared::error::ErrorCode;
use shared::models::{MenuItem, MenuItemAvailability, MenuItemCreate, MenuItemUpdate, MenuQuery};

/// Upper bound for `preparation_minutes`
const MAX_PREPARATION_MINUTES: i32 = 24 * 60;

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::MenuItemNotFound).with_detail("id", id)
}

/// GET /api/menu - 菜单列表 (category / available / dietary 过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let items = menu_item::find_all(&state.pool, &query).await?;
    Ok(Json(items))
}

/// GET /api/menu/categories - 所有分类
pub async fn categories(State(state): State<ServerState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(menu_item::find_categories(&state.pool).await?))
}

/// GET /api/menu/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItem>> {
    let item = menu_item::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(item))
}

/// POST /api/menu - 创建菜品
pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<MenuItemCreate>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    payload.name = payload.name.trim().to_string();
    payload.category = payload.category.trim().to_string();
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    validate_price(payload.price)?;
    payload.price = round_money(payload.price);
    if let Some(minutes) = payload.preparation_minutes {
        validate_range(minutes, 0, MAX_PREPARATION_MINUTES, "preparation_minutes")?;
    }

    let item = menu_item::create(&state.pool, payload).await?;
    tracing::info!(menu_item_id = item.id, name = %item.name, "Menu item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/menu/{id} - 更新菜品
///
/// `dietary_option_ids`, when present, replaces all links.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    if let Some(name) = payload.name.as_mut() {
        *name = name.trim().to_string();
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(category) = payload.category.as_mut() {
        *category = category.trim().to_string();
        validate_required_text(category, "category", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    if let Some(price) = payload.price {
        validate_price(price)?;
        payload.price = Some(round_money(price));
    }
    if let Some(minutes) = payload.preparation_minutes {
        validate_range(minutes, 0, MAX_PREPARATION_MINUTES, "preparation_minutes")?;
    }

    let item = menu_item::update(&state.pool, id, payload).await?;
    Ok(Json(item))
}

/// PATCH /api/menu/{id}/availability - 上架/下架
pub async fn set_availability(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemAvailability>,
) -> AppResult<Json<MenuItem>> {
    let item = menu_item::set_availability(&state.pool, id, payload.is_available).await?;
    tracing::info!(menu_item_id = id, is_available = payload.is_available, "Menu item availability changed");
    Ok(Json(item))
}

/// DELETE /api/menu/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !menu_item::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
