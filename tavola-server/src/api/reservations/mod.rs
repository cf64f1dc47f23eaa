//! Reservation API 模块
//!
//! `GET /availability` is public. Everything else needs a login; status
//! changes and hard deletes need `reservations:manage`.

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::auth::{permissions, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    let user_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/availability", get(handler::availability))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/cancel", post(handler::cancel));

    let manage_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .route("/{id}/status", patch(handler::set_status))
        .layer(middleware::from_fn(require_permission(
            permissions::RESERVATIONS_MANAGE,
        )));

    user_routes.merge(manage_routes)
}
