//! Authentication Handlers

use std::time::Duration;

use axum::{extract::State, http::StatusCode};

use crate::AppError;
use crate::auth::{CurrentUser, hash_password, permissions, verify_password};
use crate::core::ServerState;
use crate::db::repository::user::{self, NewUser};
use crate::security_log;
use crate::utils::Json;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text, validate_password,
    validate_username,
};
use shared::client::{ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use shared::error::ErrorCode;
use shared::models::{User, UserRole};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

fn issue_token(state: &ServerState, user: &User) -> Result<LoginResponse, AppError> {
    let perms = permissions::permissions_for(user.role);
    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(user.id, &user.username, user.role, &perms)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    Ok(LoginResponse {
        token,
        expires_in: jwt_service.expires_in_seconds(),
        user: UserInfo::from_user(user, perms),
    })
}

/// POST /api/auth/login
///
/// Unknown user and wrong password return the same error.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let username = req.username.trim().to_string();
    let found = user::find_by_username(&state.pool, &username).await?;

    // Fixed delay before looking at the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match found {
        Some(u) => {
            let password_valid = verify_password(&req.password, &u.hash_pass)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
            if !password_valid {
                security_log!("WARN", "login_failed", username = username.clone(), reason = "invalid_password");
                return Err(AppError::invalid_credentials());
            }
            if !u.is_active {
                security_log!("WARN", "login_failed", username = username.clone(), reason = "account_disabled");
                return Err(AppError::new(ErrorCode::AccountDisabled));
            }
            u
        }
        None => {
            security_log!("WARN", "login_failed", username = username.clone(), reason = "user_not_found");
            return Err(AppError::invalid_credentials());
        }
    };

    let response = issue_token(&state, &user)?;
    tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "User logged in successfully");
    Ok(Json(response))
}

/// POST /api/auth/register - 顾客自助注册
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    let username = req.username.trim().to_string();
    validate_username(&username)?;
    validate_password(&req.password)?;
    validate_email(&req.email)?;
    validate_optional_text(&req.display_name, "display_name", MAX_NAME_LEN)?;
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let hash_pass = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;

    let display_name = req
        .display_name
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| username.clone());

    let user = user::create(
        &state.pool,
        NewUser {
            username,
            hash_pass,
            email: req.email,
            display_name,
            phone: req.phone,
            role: UserRole::Customer,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Customer registered");
    Ok((StatusCode::CREATED, Json(issue_token(&state, &user)?)))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> Result<Json<UserInfo>, AppError> {
    let user = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(UserInfo::from_user(&user, permissions::permissions_for(user.role))))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    validate_password(&req.new_password)?;

    let user = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    let valid = verify_password(&req.current_password, &user.hash_pass)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
    if !valid {
        security_log!("WARN", "password_change_failed", user_id = user.id);
        return Err(AppError::invalid_credentials());
    }

    let hash_pass = hash_password(&req.new_password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;
    user::update_password(&state.pool, user.id, &hash_pass).await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}
