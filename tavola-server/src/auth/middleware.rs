//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;

use crate::AppError;
use crate::auth::{CurrentUser, JwtError, JwtService, permissions};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use shared::error::ErrorCode;

/// Routes reachable without a token
///
/// Menu browsing and table availability are open so guests can look
/// before they sign up.
pub fn is_public_route(method: &Method, path: &str) -> bool {
    if *method == Method::POST {
        return matches!(path, "/api/auth/login" | "/api/auth/register");
    }
    if *method != Method::GET {
        return false;
    }
    path == "/api/menu"
        || path == "/api/menu/categories"
        || path == "/api/dietary-options"
        || path == "/api/reservations/availability"
        || path
            .strip_prefix("/api/menu/")
            .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (`/health` 等)
/// - [`is_public_route`] 列出的公共接口
///
/// 公共接口如果带了有效令牌，仍然注入 [`CurrentUser`]。
///
/// 令牌只证明身份；账号状态和角色每次从数据库读取，停用或改角色立即生效。
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let is_public = is_public_route(req.method(), path);

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => match JwtService::extract_from_header(header) {
            Some(token) => token,
            None if is_public => return Ok(next.run(req).await),
            None => return Err(AppError::invalid_token("Invalid authorization header")),
        },
        None if is_public => return Ok(next.run(req).await),
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    let validated = state
        .get_jwt_service()
        .validate_token(token)
        .and_then(CurrentUser::try_from);

    match validated {
        Ok(claimed) => match load_account(&state, &claimed).await? {
            Some(current) => {
                req.extensions_mut().insert(current);
                Ok(next.run(req).await)
            }
            None if is_public => Ok(next.run(req).await),
            None => {
                security_log!(
                    "WARN",
                    "account_disabled",
                    user_id = claimed.id,
                    username = claimed.username.clone()
                );
                Err(AppError::new(ErrorCode::AccountDisabled))
            }
        },
        Err(_) if is_public => Ok(next.run(req).await),
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// 权限检查中间件 - 要求特定权限
///
/// ```ignore
/// Router::new()
///     .route("/", post(handler::create))
///     .layer(middleware::from_fn(require_permission("menu:manage")));
/// ```
///
/// 无权限返回 403 Forbidden
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id,
                    username = user.username.clone(),
                    required_permission = permission
                );
                return Err(AppError::forbidden(format!(
                    "Permission denied: {}",
                    permission
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

/// Current account behind a valid token; `None` if deleted or disabled
async fn load_account(
    state: &ServerState,
    claimed: &CurrentUser,
) -> Result<Option<CurrentUser>, AppError> {
    let account = user::find_by_id(&state.pool, claimed.id).await?;
    Ok(account.filter(|u| u.is_active).map(|u| CurrentUser {
        id: u.id,
        permissions: permissions::permissions_for(u.role),
        username: u.username,
        role: u.role,
    }))
}
