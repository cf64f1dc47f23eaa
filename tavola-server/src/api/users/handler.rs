//! User API Handlers

use axum::{extract::State, http::StatusCode};

use crate::auth::{CurrentUser, hash_password, permissions};
use crate::core::ServerState;
use crate::db::repository::user::{self, NewUser};
use crate::security_log;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text, validate_password,
    validate_required_text, validate_username,
};
use crate::utils::{AppError, AppResult, Json, Path, Query};
use shared::client::UserInfo;
use shared::error::ErrorCode;
use shared::models::{User, UserCreate, UserQuery, UserUpdate};

fn to_info(user: &User) -> UserInfo {
    UserInfo::from_user(user, permissions::permissions_for(user.role))
}

/// GET /api/users - 用户列表 (可按角色过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<UserInfo>>> {
    let users = user::find_all(&state.pool, query.role).await?;
    Ok(Json(users.iter().map(to_info).collect()))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserInfo>> {
    let user = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("id", id))?;
    Ok(Json(to_info(&user)))
}

/// POST /api/users - 创建任意角色的用户
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    let username = payload.username.trim().to_string();
    validate_username(&username)?;
    validate_password(&payload.password)?;
    validate_email(&payload.email)?;
    validate_optional_text(&payload.display_name, "display_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let hash_pass = hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;

    let display_name = payload
        .display_name
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| username.clone());

    let created = user::create(
        &state.pool,
        NewUser {
            username,
            hash_pass,
            email: payload.email,
            display_name,
            phone: payload.phone,
            role: payload.role,
        },
    )
    .await?;

    tracing::info!(user_id = created.id, role = %created.role, by = current.id, "User created");
    Ok((StatusCode::CREATED, Json(to_info(&created))))
}

/// PUT /api/users/{id} - 部分更新 (含密码)
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(mut payload): Json<UserUpdate>,
) -> AppResult<Json<UserInfo>> {
    if let Some(username) = &payload.username {
        let trimmed = username.trim().to_string();
        validate_username(&trimmed)?;
        payload.username = Some(trimmed);
    }
    if let Some(display_name) = &payload.display_name {
        validate_required_text(display_name, "display_name", MAX_NAME_LEN)?;
    }
    validate_email(&payload.email)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    // 不能取消自己的管理员身份或停用自己
    if id == current.id
        && (payload.is_active == Some(false)
            || payload.role.is_some_and(|r| r != current.role))
    {
        return Err(AppError::forbidden("Cannot change your own role or disable your own account"));
    }

    let hash_pass = match payload.password.take() {
        Some(password) => {
            validate_password(&password)?;
            Some(
                hash_password(&password)
                    .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?,
            )
        }
        None => None,
    };

    let updated = user::update(&state.pool, id, payload, hash_pass).await?;
    tracing::info!(user_id = id, by = current.id, "User updated");
    Ok(Json(to_info(&updated)))
}

/// DELETE /api/users/{id} - 不能删除自己
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if id == current.id {
        security_log!("WARN", "self_delete_attempt", user_id = current.id);
        return Err(AppError::new(ErrorCode::CannotDeleteSelf));
    }
    if !user::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::UserNotFound).with_detail("id", id));
    }
    tracing::info!(user_id = id, by = current.id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
