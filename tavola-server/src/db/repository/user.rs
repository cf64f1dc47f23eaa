//! User Repository

use super::{RepoError, RepoResult, map_duplicate};
use shared::error::ErrorCode;
use shared::models::{User, UserRole, UserUpdate};
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT id, username, email, display_name, phone, role, hash_pass, is_active, created_at, updated_at FROM users";

/// Fields for a new account, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub hash_pass: String,
    pub email: Option<String>,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
}

/// Map unique violations on `users` to the column that collided
fn map_user_duplicate(err: RepoError) -> RepoError {
    match err {
        RepoError::Duplicate(ref msg) if msg.contains("email") => {
            RepoError::business(ErrorCode::EmailExists)
        }
        other => map_duplicate(other, ErrorCode::UsernameExists),
    }
}

pub async fn find_all(pool: &SqlitePool, role: Option<UserRole>) -> RepoResult<Vec<User>> {
    let users = match role {
        Some(role) => {
            let sql = format!("{USER_SELECT} WHERE role = ? ORDER BY username");
            sqlx::query_as::<_, User>(&sql)
                .bind(role)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("{USER_SELECT} ORDER BY username");
            sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?
        }
    };
    Ok(users)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE username = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn count_by_role(pool: &SqlitePool, role: UserRole) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = ?")
        .bind(role)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(pool: &SqlitePool, data: NewUser) -> RepoResult<User> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO users (id, username, email, display_name, phone, role, hash_pass, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
    )
    .bind(id)
    .bind(&data.username)
    .bind(&data.email)
    .bind(&data.display_name)
    .bind(&data.phone)
    .bind(data.role)
    .bind(&data.hash_pass)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| map_user_duplicate(e.into()))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Partial update; `hash_pass` replaces the stored hash when present
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: UserUpdate,
    hash_pass: Option<String>,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE users SET username = COALESCE(?1, username), email = COALESCE(?2, email), display_name = COALESCE(?3, display_name), phone = COALESCE(?4, phone), role = COALESCE(?5, role), is_active = COALESCE(?6, is_active), hash_pass = COALESCE(?7, hash_pass), updated_at = ?8 WHERE id = ?9",
    )
    .bind(data.username)
    .bind(data.email)
    .bind(data.display_name)
    .bind(data.phone)
    .bind(data.role)
    .bind(data.is_active)
    .bind(hash_pass)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| map_user_duplicate(e.into()))?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::business(ErrorCode::UserNotFound));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::business(ErrorCode::UserNotFound))
}

pub async fn update_password(pool: &SqlitePool, id: i64, hash_pass: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE users SET hash_pass = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(hash_pass)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::business(ErrorCode::UserNotFound));
    }
    Ok(())
}

/// Orders keep a hard reference to their creator, so those accounts are
/// deactivated instead of removed.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| match RepoError::from(e) {
            RepoError::Conflict(_) => {
                RepoError::Conflict("User has orders; deactivate the account instead".into())
            }
            other => other,
        })?;
    Ok(result.rows_affected() > 0)
}
