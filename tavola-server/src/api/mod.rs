//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、注册、当前用户
//! - [`users`] - 用户管理
//! - [`menu`] - 菜单
//! - [`dietary_options`] - 饮食标签
//! - [`tables`] - 桌台管理
//! - [`reservations`] - 预订
//! - [`orders`] - 订单
//! - [`cart`] - 购物车
//! - [`inventory`] - 库存
//! - [`shifts`] - 排班

pub mod auth;
pub mod cart;
pub mod dietary_options;
pub mod health;
pub mod inventory;
pub mod menu;
pub mod orders;
pub mod reservations;
pub mod shifts;
pub mod tables;
pub mod users;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::utils::{AppError, ErrorCode};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(menu::router())
        .merge(dietary_options::router())
        .merge(tables::router())
        .merge(reservations::router())
        .merge(orders::router())
        .merge(cart::router())
        .merge(inventory::router())
        .merge(shifts::router())
        .fallback(route_not_found)
}

/// Unknown paths get the JSON error body too
async fn route_not_found(uri: http::Uri) -> AppError {
    AppError::with_message(ErrorCode::NotFound, format!("No route for {}", uri.path()))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin {
        "*" => layer.allow_origin(Any),
        origin => match HeaderValue::from_str(origin) {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!(origin, "Invalid CORS_ALLOW_ORIGIN, falling back to any origin");
                layer.allow_origin(Any)
            }
        },
    }
}

/// Build a fully configured application with all middleware
///
/// Used by the HTTP server and by the integration tests.
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router()
        // JWT authentication - injects CurrentUser
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ))
        .layer(cors_layer(&state.config.cors_allow_origin))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}
