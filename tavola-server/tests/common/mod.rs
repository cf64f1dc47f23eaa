//! Shared harness: a fresh server on a temp SQLite file, driven in-process.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::UserRole;
use tavola_server::auth::permissions;
use tavola_server::{Config, ServerState, api};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("tavola.db");
        let config = Config::for_database(db_path.to_string_lossy().to_string());
        let state = ServerState::initialize(&config)
            .await
            .expect("server state");
        let router = api::build_app(&state).with_state(state.clone());
        Self {
            router,
            state,
            _dir: dir,
        }
    }

    /// Send a request; the body is `Value::Null` when the response is empty.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    /// Send a raw body; returns the status, `Content-Type` and raw text
    pub async fn request_raw(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: &str,
    ) -> (StatusCode, String, String) {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body.to_string())).expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router");
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        (status, content_type, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, path, token, None).await
    }

    /// Token for the bootstrap admin, signed directly (skips the login delay)
    pub async fn admin_token(&self) -> String {
        let admin = tavola_server::db::repository::user::find_by_username(
            &self.state.pool,
            ADMIN_USERNAME,
        )
        .await
        .expect("query admin")
        .expect("bootstrap admin exists");
        self.sign(admin.id, &admin.username, admin.role)
    }

    pub fn sign(&self, user_id: i64, username: &str, role: UserRole) -> String {
        self.state
            .jwt_service
            .generate_token(user_id, username, role, &permissions::permissions_for(role))
            .expect("sign token")
    }

    /// Register a customer; returns `(token, user id)`
    pub async fn register_customer(&self, username: &str) -> (String, i64) {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "username": username,
                    "password": "secret123",
                    "email": format!("{username}@example.com"),
                    "display_name": format!("Guest {username}"),
                    "phone": "555-0100",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        (
            body["token"].as_str().expect("token").to_string(),
            body["user"]["id"].as_i64().expect("user id"),
        )
    }

    /// Create a staff account through the users API; returns `(token, user id)`
    pub async fn create_staff(&self, username: &str, role: UserRole) -> (String, i64) {
        let admin = self.admin_token().await;
        let (status, body) = self
            .post(
                "/api/users",
                Some(&admin),
                json!({
                    "username": username,
                    "password": "secret123",
                    "display_name": username,
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create staff failed: {body}");
        let id = body["id"].as_i64().expect("user id");
        (self.sign(id, username, role), id)
    }

    pub async fn create_table(&self, token: &str, number: i32, capacity: i32) -> i64 {
        let (status, body) = self
            .post(
                "/api/tables",
                Some(token),
                json!({ "number": number, "capacity": capacity }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create table failed: {body}");
        body["id"].as_i64().expect("table id")
    }

    pub async fn create_menu_item(&self, token: &str, name: &str, price: f64) -> i64 {
        let (status, body) = self
            .post(
                "/api/menu",
                Some(token),
                json!({ "name": name, "price": price, "category": "Mains" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create menu item failed: {body}");
        body["id"].as_i64().expect("menu item id")
    }
}

/// A date comfortably in the future, as `YYYY-MM-DD`
pub fn future_date(days: i64) -> String {
    (shared::util::today() + chrono::Duration::days(days)).to_string()
}
