//! Menu Item Repository
//!
//! Dietary options are a many-to-many join (`menu_item_dietary`); every
//! read attaches them to the returned items.

use super::{RepoError, RepoResult, map_duplicate};
use shared::error::ErrorCode;
use shared::models::{DietaryOption, MenuItem, MenuItemCreate, MenuItemUpdate, MenuQuery};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;

const MENU_COLUMNS: &str = "m.id, m.name, m.description, m.price, m.category, m.image_url, m.is_available, m.preparation_minutes, m.created_at, m.updated_at";

#[derive(sqlx::FromRow)]
struct DietaryLink {
    menu_item_id: i64,
    id: i64,
    name: String,
    description: Option<String>,
}

async fn attach_dietary_options(pool: &SqlitePool, items: &mut [MenuItem]) -> RepoResult<()> {
    if items.is_empty() {
        return Ok(());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT l.menu_item_id, d.id, d.name, d.description FROM menu_item_dietary l JOIN dietary_options d ON d.id = l.dietary_option_id WHERE l.menu_item_id IN (",
    );
    let mut sep = qb.separated(", ");
    for item in items.iter() {
        sep.push_bind(item.id);
    }
    qb.push(") ORDER BY d.name");

    let links: Vec<DietaryLink> = qb.build_query_as().fetch_all(pool).await?;

    let mut by_item: HashMap<i64, Vec<DietaryOption>> = HashMap::new();
    for link in links {
        by_item.entry(link.menu_item_id).or_default().push(DietaryOption {
            id: link.id,
            name: link.name,
            description: link.description,
        });
    }
    for item in items.iter_mut() {
        item.dietary_options = by_item.remove(&item.id).unwrap_or_default();
    }
    Ok(())
}

/// Replace the dietary links of an item; unknown option ids are rejected
async fn replace_dietary_links(
    conn: &mut SqliteConnection,
    menu_item_id: i64,
    option_ids: &[i64],
) -> RepoResult<()> {
    let mut ids = option_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    for option_id in &ids {
        let exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM dietary_options WHERE id = ?")
                .bind(option_id)
                .fetch_one(&mut *conn)
                .await?;
        if exists == 0 {
            return Err(RepoError::Validation(format!(
                "Unknown dietary option id: {option_id}"
            )));
        }
    }

    sqlx::query("DELETE FROM menu_item_dietary WHERE menu_item_id = ?")
        .bind(menu_item_id)
        .execute(&mut *conn)
        .await?;
    for option_id in ids {
        sqlx::query("INSERT INTO menu_item_dietary (menu_item_id, dietary_option_id) VALUES (?, ?)")
            .bind(menu_item_id)
            .bind(option_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Ordered by category, then name
pub async fn find_all(pool: &SqlitePool, query: &MenuQuery) -> RepoResult<Vec<MenuItem>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {MENU_COLUMNS} FROM menu_items m WHERE 1 = 1"));
    if let Some(category) = &query.category {
        qb.push(" AND m.category = ").push_bind(category.clone());
    }
    if let Some(available) = query.available {
        qb.push(" AND m.is_available = ").push_bind(available);
    }
    if let Some(dietary) = query.dietary {
        qb.push(" AND EXISTS (SELECT 1 FROM menu_item_dietary l WHERE l.menu_item_id = m.id AND l.dietary_option_id = ")
            .push_bind(dietary)
            .push(")");
    }
    qb.push(" ORDER BY m.category, m.name");

    let mut items: Vec<MenuItem> = qb.build_query_as().fetch_all(pool).await?;
    attach_dietary_options(pool, &mut items).await?;
    Ok(items)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuItem>> {
    let sql = format!("SELECT {MENU_COLUMNS} FROM menu_items m WHERE m.id = ?");
    let item = sqlx::query_as::<_, MenuItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match item {
        Some(item) => {
            let mut items = [item];
            attach_dietary_options(pool, &mut items).await?;
            let [item] = items;
            Ok(Some(item))
        }
        None => Ok(None),
    }
}

pub async fn find_categories(pool: &SqlitePool) -> RepoResult<Vec<String>> {
    let categories = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT category FROM menu_items ORDER BY category",
    )
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn create(pool: &SqlitePool, data: MenuItemCreate) -> RepoResult<MenuItem> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    let mut tx = super::begin_immediate(pool).await?;
    sqlx::query(
        "INSERT INTO menu_items (id, name, description, price, category, image_url, is_available, preparation_minutes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.category)
    .bind(&data.image_url)
    .bind(data.is_available.unwrap_or(true))
    .bind(data.preparation_minutes)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| map_duplicate(e.into(), ErrorCode::MenuItemNameExists))?;

    replace_dietary_links(&mut tx, id, &data.dietary_option_ids).await?;
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: MenuItemUpdate) -> RepoResult<MenuItem> {
    let now = shared::util::now_millis();

    let mut tx = super::begin_immediate(pool).await?;
    let rows = sqlx::query(
        "UPDATE menu_items SET name = COALESCE(?1, name), description = COALESCE(?2, description), price = COALESCE(?3, price), category = COALESCE(?4, category), image_url = COALESCE(?5, image_url), is_available = COALESCE(?6, is_available), preparation_minutes = COALESCE(?7, preparation_minutes), updated_at = ?8 WHERE id = ?9",
    )
    .bind(data.name)
    .bind(data.description)
    .bind(data.price)
    .bind(data.category)
    .bind(data.image_url)
    .bind(data.is_available)
    .bind(data.preparation_minutes)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| map_duplicate(e.into(), ErrorCode::MenuItemNameExists))?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::business(ErrorCode::MenuItemNotFound));
    }
    if let Some(option_ids) = &data.dietary_option_ids {
        replace_dietary_links(&mut tx, id, option_ids).await?;
    }
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::business(ErrorCode::MenuItemNotFound))
}

pub async fn set_availability(pool: &SqlitePool, id: i64, available: bool) -> RepoResult<MenuItem> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE menu_items SET is_available = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(available)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::business(ErrorCode::MenuItemNotFound));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::business(ErrorCode::MenuItemNotFound))
}

/// Past orders keep their name/price snapshot, so deletion is unrestricted
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM menu_items WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
