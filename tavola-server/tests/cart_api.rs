mod common;

use common::TestApp;
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn empty_cart_by_default() {
    let app = TestApp::spawn().await;
    let (alice, _) = app.register_customer("alice").await;

    let (status, cart) = app.get("/api/cart", Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cart["items"].as_array().unwrap().is_empty());
    assert_eq!(cart["item_count"], 0);
    assert_eq!(cart["subtotal"], 0.0);
}

#[tokio::test]
async fn add_merge_update_remove() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let pasta = app.create_menu_item(&admin, "Pasta", 12.5).await;
    let wine = app.create_menu_item(&admin, "Wine", 6.0).await;
    let (alice, _) = app.register_customer("alice").await;

    app.post("/api/cart/items", Some(&alice), json!({ "menu_item_id": pasta, "quantity": 2 }))
        .await;
    let (status, cart) = app
        .post("/api/cart/items", Some(&alice), json!({ "menu_item_id": pasta }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 3);

    let (_, cart) = app
        .post("/api/cart/items", Some(&alice), json!({ "menu_item_id": wine, "quantity": 1 }))
        .await;
    assert_eq!(cart["item_count"], 4);
    assert_eq!(cart["subtotal"], 43.5);

    let (status, cart) = app
        .put(&format!("/api/cart/items/{pasta}"), Some(&alice), json!({ "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["subtotal"], 18.5);

    let (_, cart) = app
        .put(&format!("/api/cart/items/{wine}"), Some(&alice), json!({ "quantity": 0 }))
        .await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .delete(&format!("/api/cart/items/{wine}"), Some(&alice))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3001);

    let (status, _) = app.delete("/api/cart", Some(&alice)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, cart) = app.get("/api/cart", Some(&alice)).await;
    assert_eq!(cart["item_count"], 0);
}

#[tokio::test]
async fn cart_rejects_unknown_and_unavailable_items() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let special = app.create_menu_item(&admin, "Special", 20.0).await;
    app.patch(
        &format!("/api/menu/{special}/availability"),
        Some(&admin),
        json!({ "is_available": false }),
    )
    .await;
    let (alice, _) = app.register_customer("alice").await;

    let (status, body) = app
        .post("/api/cart/items", Some(&alice), json!({ "menu_item_id": 777 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);

    let (status, body) = app
        .post("/api/cart/items", Some(&alice), json!({ "menu_item_id": special }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6002);

    let (status, _) = app.get("/api/cart", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn checkout_creates_order_and_clears_cart() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let burger = app.create_menu_item(&admin, "Burger", 9.99).await;
    let (alice, _) = app.register_customer("alice").await;

    let (status, body) = app
        .post("/api/cart/checkout", Some(&alice), json!({ "order_type": "TAKEAWAY" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4002);

    app.post("/api/cart/items", Some(&alice), json!({ "menu_item_id": burger, "quantity": 3 }))
        .await;

    // Dine-in without a table fails and keeps the cart
    let (status, body) = app.post("/api/cart/checkout", Some(&alice), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4004);
    let (_, cart) = app.get("/api/cart", Some(&alice)).await;
    assert_eq!(cart["item_count"], 3);

    let (status, order) = app
        .post(
            "/api/cart/checkout",
            Some(&alice),
            json!({ "order_type": "TAKEAWAY", "customer_name": "Alice" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["total_amount"], 29.97);
    assert_eq!(order["items"][0]["quantity"], 3);

    let (_, cart) = app.get("/api/cart", Some(&alice)).await;
    assert_eq!(cart["item_count"], 0);

    let (_, orders) = app.get("/api/orders", Some(&alice)).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn expired_carts_are_swept() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let tea = app.create_menu_item(&admin, "Tea", 3.0).await;
    let (alice, _) = app.register_customer("alice").await;
    app.post("/api/cart/items", Some(&alice), json!({ "menu_item_id": tea }))
        .await;
    assert_eq!(app.state.carts.len(), 1);

    let later = shared::util::now_millis() + 3 * 60 * 60 * 1000;
    assert_eq!(app.state.carts.sweep_expired(later), 1);
    assert!(app.state.carts.is_empty());
}
