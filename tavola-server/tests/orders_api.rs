mod common;

use common::TestApp;
use http::StatusCode;
use serde_json::json;
use shared::models::UserRole;

struct Seed {
    app: TestApp,
    table: i64,
    pizza: i64,
    soda: i64,
}

async fn seeded() -> Seed {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let table = app.create_table(&admin, 1, 4).await;
    let pizza = app.create_menu_item(&admin, "Pizza", 10.1).await;
    let soda = app.create_menu_item(&admin, "Soda", 0.1).await;
    Seed {
        app,
        table,
        pizza,
        soda,
    }
}

#[tokio::test]
async fn order_prices_come_from_the_menu() {
    let Seed { app, table, pizza, soda } = seeded().await;
    let (alice, alice_id) = app.register_customer("alice").await;

    let (status, order) = app
        .post(
            "/api/orders",
            Some(&alice),
            json!({
                "table_id": table,
                "items": [
                    { "menu_item_id": pizza, "quantity": 2, "note": "extra basil" },
                    { "menu_item_id": soda, "quantity": 3 },
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["user_id"], alice_id);
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["order_type"], "DINE_IN");
    // 2 * 10.1 + 3 * 0.1, without float drift
    assert_eq!(order["total_amount"], 20.5);

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Pizza");
    assert_eq!(items[0]["unit_price"], 10.1);
    assert_eq!(items[0]["line_total"], 20.2);
    assert_eq!(items[0]["note"], "extra basil");
}

#[tokio::test]
async fn order_validation() {
    let Seed { app, table, pizza, .. } = seeded().await;
    let admin = app.admin_token().await;
    let (alice, _) = app.register_customer("alice").await;

    let (status, body) = app
        .post("/api/orders", Some(&alice), json!({ "table_id": table, "items": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4002);

    let (status, body) = app
        .post(
            "/api/orders",
            Some(&alice),
            json!({ "items": [{ "menu_item_id": pizza, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4004);

    let (status, _) = app
        .post(
            "/api/orders",
            Some(&alice),
            json!({ "order_type": "TAKEAWAY", "items": [{ "menu_item_id": pizza, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(
            "/api/orders",
            Some(&alice),
            json!({ "table_id": table, "items": [{ "menu_item_id": pizza, "quantity": 100 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4005);

    let (status, body) = app
        .post(
            "/api/orders",
            Some(&alice),
            json!({ "table_id": table, "items": [{ "menu_item_id": 12345, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);

    app.patch(
        &format!("/api/menu/{pizza}/availability"),
        Some(&admin),
        json!({ "is_available": false }),
    )
    .await;
    let (status, body) = app
        .post(
            "/api/orders",
            Some(&alice),
            json!({ "table_id": table, "items": [{ "menu_item_id": pizza, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6002);
}

#[tokio::test]
async fn visibility_and_kitchen_queue() {
    let Seed { app, table, pizza, .. } = seeded().await;
    let (alice, _) = app.register_customer("alice").await;
    let (bob, _) = app.register_customer("bob").await;
    let (chef, _) = app.create_staff("chef", UserRole::Chef).await;
    let order = json!({ "table_id": table, "items": [{ "menu_item_id": pizza, "quantity": 1 }] });

    let (_, first) = app.post("/api/orders", Some(&alice), order.clone()).await;
    let (_, second) = app.post("/api/orders", Some(&bob), order).await;
    let first_id = first["id"].as_i64().unwrap();

    let (_, mine) = app.get("/api/orders", Some(&alice)).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let (status, _) = app.get(&format!("/api/orders/{first_id}"), Some(&bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/orders/kitchen", Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .patch(
            &format!("/api/orders/{first_id}/status"),
            Some(&chef),
            json!({ "status": "READY" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, queue) = app.get("/api/orders/kitchen", Some(&chef)).await;
    assert_eq!(status, StatusCode::OK);
    let queue = queue.as_array().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0]["id"], second["id"]);

    let (_, all) = app.get("/api/orders?status=READY", Some(&chef)).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn owner_cancels_only_pending_orders() {
    let Seed { app, table, pizza, .. } = seeded().await;
    let (alice, _) = app.register_customer("alice").await;
    let (waiter, _) = app.create_staff("walt", UserRole::Waiter).await;
    let order = json!({ "table_id": table, "items": [{ "menu_item_id": pizza, "quantity": 1 }] });

    let (_, pending) = app.post("/api/orders", Some(&alice), order.clone()).await;
    let id = pending["id"].as_i64().unwrap();
    let (status, cancelled) = app
        .post(&format!("/api/orders/{id}/cancel"), Some(&alice), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "CANCELLED");

    let (_, cooking) = app.post("/api/orders", Some(&alice), order).await;
    let id = cooking["id"].as_i64().unwrap();
    app.patch(
        &format!("/api/orders/{id}/status"),
        Some(&waiter),
        json!({ "status": "PREPARING" }),
    )
    .await;

    let (status, body) = app
        .post(&format!("/api/orders/{id}/cancel"), Some(&alice), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4003);

    let (status, _) = app
        .post(&format!("/api/orders/{id}/cancel"), Some(&waiter), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_requires_orders_manage() {
    let Seed { app, table, pizza, .. } = seeded().await;
    let (alice, _) = app.register_customer("alice").await;
    let (waiter, _) = app.create_staff("walt", UserRole::Waiter).await;
    let (manager, _) = app.create_staff("mgr", UserRole::Manager).await;

    let (_, order) = app
        .post(
            "/api/orders",
            Some(&alice),
            json!({ "table_id": table, "items": [{ "menu_item_id": pizza, "quantity": 1 }] }),
        )
        .await;
    let path = format!("/api/orders/{}", order["id"]);

    let (status, _) = app.delete(&path, Some(&waiter)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&path, Some(&manager)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = app.get(&path, Some(&manager)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);
}
