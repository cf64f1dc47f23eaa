mod common;

use common::{TestApp, future_date};
use http::{Method, StatusCode};
use serde_json::Value;

fn error_body(content_type: &str, body: &str) -> Value {
    assert!(
        content_type.starts_with("application/json"),
        "expected JSON, got {content_type}: {body}"
    );
    let value: Value = serde_json::from_str(body).expect("json error body");
    assert!(value["error"].is_string(), "{value}");
    value
}

#[tokio::test]
async fn unparsable_path_id_is_a_json_400() {
    let app = TestApp::spawn().await;
    let (status, content_type, body) = app.request_raw(Method::GET, "/api/menu/abc", None, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_body(&content_type, &body)["code"], 5);
}

#[tokio::test]
async fn missing_query_field_is_a_json_400() {
    let app = TestApp::spawn().await;
    let path = format!("/api/reservations/availability?date={}", future_date(2));
    let (status, content_type, body) = app.request_raw(Method::GET, &path, None, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let value = error_body(&content_type, &body);
    assert_eq!(value["code"], 2);
    assert!(value["error"].as_str().unwrap().contains("party_size"));
}

#[tokio::test]
async fn wrongly_typed_body_is_a_json_400() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (status, content_type, body) = app
        .request_raw(Method::POST, "/api/tables", Some(&admin), r#"{"number":"x"}"#)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_body(&content_type, &body)["code"], 2);
}

#[tokio::test]
async fn malformed_json_is_a_json_400() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (status, content_type, body) = app
        .request_raw(Method::POST, "/api/tables", Some(&admin), "{not json")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_body(&content_type, &body)["code"], 5);
}

#[tokio::test]
async fn unknown_route_is_a_json_404() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (status, body) = app.get("/api/nowhere", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3);

    let (status, body) = app.get("/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3);
}
