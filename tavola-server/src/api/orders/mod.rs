//! Order API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::auth::{permissions, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let user_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", post(handler::cancel));

    // 后厨 / 服务员
    let kitchen_routes = Router::new()
        .route("/kitchen", get(handler::kitchen_queue))
        .route("/{id}/status", patch(handler::set_status))
        .layer(middleware::from_fn(require_permission(
            permissions::ORDERS_UPDATE_STATUS,
        )));

    let manage_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_permission(permissions::ORDERS_MANAGE)));

    user_routes.merge(kitchen_routes).merge(manage_routes)
}
