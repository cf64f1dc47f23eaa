//! Order Repository
//!
//! Line prices are snapshotted from the menu at creation time; the client
//! never supplies prices.

use super::{RepoError, RepoResult};
use crate::order_money;
use chrono::NaiveDate;
use shared::error::ErrorCode;
use shared::models::{Order, OrderItem, OrderItemInput, OrderQuery, OrderStatus, OrderType};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;

const ORDER_COLUMNS: &str = "id, user_id, table_id, customer_name, order_type, status, total_amount, note, created_at, updated_at";

const DAY_MILLIS: i64 = 86_400_000;

/// Validated order request
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub table_id: Option<i64>,
    pub customer_name: Option<String>,
    pub order_type: OrderType,
    pub items: Vec<OrderItemInput>,
    pub note: Option<String>,
}

#[derive(sqlx::FromRow)]
struct PricedMenuItem {
    name: String,
    price: f64,
    is_available: bool,
}

async fn attach_items(pool: &SqlitePool, orders: &mut [Order]) -> RepoResult<()> {
    if orders.is_empty() {
        return Ok(());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, order_id, menu_item_id, name, unit_price, quantity, line_total, note FROM order_items WHERE order_id IN (",
    );
    let mut sep = qb.separated(", ");
    for order in orders.iter() {
        sep.push_bind(order.id);
    }
    qb.push(") ORDER BY id");

    let items: Vec<OrderItem> = qb.build_query_as().fetch_all(pool).await?;
    let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }
    for order in orders.iter_mut() {
        order.items = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(())
}

/// UTC day bounds in epoch millis
fn day_range(date: NaiveDate) -> (i64, i64) {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis();
    (start, start + DAY_MILLIS)
}

/// `user_id` restricts to one owner
pub async fn find_all(
    pool: &SqlitePool,
    user_id: Option<i64>,
    query: &OrderQuery,
) -> RepoResult<Vec<Order>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1 = 1"));
    if let Some(user_id) = user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(table_id) = query.table_id {
        qb.push(" AND table_id = ").push_bind(table_id);
    }
    if let Some(date) = query.date {
        let (start, end) = day_range(date);
        qb.push(" AND created_at >= ")
            .push_bind(start)
            .push(" AND created_at < ")
            .push_bind(end);
    }
    qb.push(" ORDER BY created_at DESC");

    let mut orders: Vec<Order> = qb.build_query_as().fetch_all(pool).await?;
    attach_items(pool, &mut orders).await?;
    Ok(orders)
}

/// Kitchen queue: pending and preparing, oldest first
pub async fn find_kitchen_queue(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE status IN ('PENDING', 'PREPARING') ORDER BY created_at ASC"
    );
    let mut orders = sqlx::query_as::<_, Order>(&sql).fetch_all(pool).await?;
    attach_items(pool, &mut orders).await?;
    Ok(orders)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match order {
        Some(order) => {
            let mut orders = [order];
            attach_items(pool, &mut orders).await?;
            let [order] = orders;
            Ok(Some(order))
        }
        None => Ok(None),
    }
}

/// Price every line from the menu and write order + items atomically
pub async fn create(pool: &SqlitePool, data: NewOrder) -> RepoResult<Order> {
    if data.items.is_empty() {
        return Err(RepoError::business(ErrorCode::OrderEmpty));
    }
    if data.order_type == OrderType::DineIn && data.table_id.is_none() {
        return Err(RepoError::business(ErrorCode::OrderTableRequired));
    }
    for input in &data.items {
        order_money::validate_quantity(input.quantity)
            .map_err(|e| RepoError::Business(e.code, e.message))?;
    }

    let mut tx = super::begin_immediate(pool).await?;

    if let Some(table_id) = data.table_id {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM dining_tables WHERE id = ?")
            .bind(table_id)
            .fetch_one(&mut *tx)
            .await?;
        if exists == 0 {
            return Err(RepoError::business(ErrorCode::TableNotFound));
        }
    }

    let order_id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    let mut lines = Vec::with_capacity(data.items.len());
    for input in &data.items {
        let menu = sqlx::query_as::<_, PricedMenuItem>(
            "SELECT name, price, is_available FROM menu_items WHERE id = ?",
        )
        .bind(input.menu_item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            RepoError::Business(
                ErrorCode::MenuItemNotFound,
                format!("Menu item {} not found", input.menu_item_id),
            )
        })?;
        if !menu.is_available {
            return Err(RepoError::Business(
                ErrorCode::MenuItemUnavailable,
                format!("{} is not available", menu.name),
            ));
        }

        let line_total = order_money::to_f64(order_money::line_total(menu.price, input.quantity));
        lines.push(OrderItem {
            id: shared::util::snowflake_id(),
            order_id,
            menu_item_id: input.menu_item_id,
            name: menu.name,
            unit_price: menu.price,
            quantity: input.quantity,
            line_total,
            note: input.note.clone(),
        });
    }

    let total = order_money::order_total(lines.iter().map(|l| (l.unit_price, l.quantity)));

    sqlx::query(
        "INSERT INTO orders (id, user_id, table_id, customer_name, order_type, status, total_amount, note, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 'PENDING', ?6, ?7, ?8, ?8)",
    )
    .bind(order_id)
    .bind(data.user_id)
    .bind(data.table_id)
    .bind(&data.customer_name)
    .bind(data.order_type)
    .bind(total)
    .bind(&data.note)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for line in &lines {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, menu_item_id, name, unit_price, quantity, line_total, note) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(line.id)
        .bind(line.order_id)
        .bind(line.menu_item_id)
        .bind(&line.name)
        .bind(line.unit_price)
        .bind(line.quantity)
        .bind(line.line_total)
        .bind(&line.note)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(order_id, user_id = data.user_id, items = lines.len(), total, "Order created");

    find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

pub async fn set_status(pool: &SqlitePool, id: i64, status: OrderStatus) -> RepoResult<Order> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::business(ErrorCode::OrderNotFound));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::business(ErrorCode::OrderNotFound))
}

/// Items go with the order (ON DELETE CASCADE)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
