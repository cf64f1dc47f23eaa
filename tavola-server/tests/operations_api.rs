//! Tables, inventory and shifts

mod common;

use common::{TestApp, future_date};
use http::StatusCode;
use serde_json::json;
use shared::models::UserRole;

const HOUR: i64 = 60 * 60 * 1000;

#[tokio::test]
async fn tables_crud_and_permissions() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let (waiter, _) = app.create_staff("walt", UserRole::Waiter).await;
    let (alice, _) = app.register_customer("alice").await;

    let (status, body) = app
        .post("/api/tables", Some(&admin), json!({ "number": 3 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["capacity"], 4);
    assert_eq!(body["status"], "AVAILABLE");
    let id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .post("/api/tables", Some(&admin), json!({ "number": 3, "capacity": 2 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7002);

    let (status, body) = app
        .post("/api/tables", Some(&admin), json!({ "number": 4, "capacity": 21 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7005);

    let (status, _) = app.get("/api/tables", Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, list) = app.get("/api/tables", Some(&waiter)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = app
        .patch(
            &format!("/api/tables/{id}/status"),
            Some(&waiter),
            json!({ "status": "OCCUPIED" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .patch(
            &format!("/api/tables/{id}/status"),
            Some(&admin),
            json!({ "status": "OUT_OF_SERVICE" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OUT_OF_SERVICE");

    let (_, filtered) = app.get("/api/tables?status=AVAILABLE", Some(&waiter)).await;
    assert!(filtered.as_array().unwrap().is_empty());

    let (status, body) = app
        .put(&format!("/api/tables/{id}"), Some(&admin), json!({ "location": "Terrace" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "Terrace");
}

#[tokio::test]
async fn out_of_service_tables_are_not_bookable() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let id = app.create_table(&admin, 1, 4).await;
    app.patch(
        &format!("/api/tables/{id}/status"),
        Some(&admin),
        json!({ "status": "OUT_OF_SERVICE" }),
    )
    .await;

    let date = future_date(2);
    let (_, slots) = app
        .get(&format!("/api/reservations/availability?date={date}&party_size=2"), None)
        .await;
    assert!(slots.as_array().unwrap().iter().all(|s| s["available"] == false));

    let (alice, _) = app.register_customer("alice").await;
    let (status, body) = app
        .post(
            "/api/reservations",
            Some(&alice),
            json!({ "party_size": 2, "date": date, "time": "19:00", "table_id": id }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7003);
}

#[tokio::test]
async fn table_with_reservations_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let id = app.create_table(&admin, 1, 4).await;
    let (alice, _) = app.register_customer("alice").await;
    app.post(
        "/api/reservations",
        Some(&alice),
        json!({ "party_size": 2, "date": future_date(1), "time": "12:00" }),
    )
    .await;

    let (status, body) = app.delete(&format!("/api/tables/{id}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7004);

    let spare = app.create_table(&admin, 2, 2).await;
    let (status, _) = app.delete(&format!("/api/tables/{spare}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn inventory_adjust_and_low_stock() {
    let app = TestApp::spawn().await;
    let (manager, _) = app.create_staff("mgr", UserRole::Manager).await;
    let (chef, _) = app.create_staff("chef", UserRole::Chef).await;

    let (status, flour) = app
        .post(
            "/api/inventory",
            Some(&manager),
            json!({ "name": "Flour", "quantity": 10.0, "unit": "kg", "reorder_level": 5.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{flour}");
    let id = flour["id"].as_i64().unwrap();

    let (status, _) = app
        .post(
            "/api/inventory",
            Some(&chef),
            json!({ "name": "Salt", "unit": "kg" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(
            "/api/inventory",
            Some(&manager),
            json!({ "name": "Oil", "unit": "l", "quantity": -1.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (_, low) = app.get("/api/inventory/low-stock", Some(&chef)).await;
    assert!(low.as_array().unwrap().is_empty());

    let (status, body) = app
        .patch(
            &format!("/api/inventory/{id}/adjust"),
            Some(&manager),
            json!({ "delta": -6.5, "reason": "weekend prep" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 3.5);

    let (_, low) = app.get("/api/inventory/low-stock", Some(&chef)).await;
    assert_eq!(low.as_array().unwrap().len(), 1);

    let (status, body) = app
        .patch(
            &format!("/api/inventory/{id}/adjust"),
            Some(&manager),
            json!({ "delta": -4.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 8503);

    let (_, unchanged) = app.get(&format!("/api/inventory/{id}"), Some(&chef)).await;
    assert_eq!(unchanged["quantity"], 3.5);

    let (status, body) = app
        .patch("/api/inventory/424242/adjust", Some(&manager), json!({ "delta": 1.0 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 8501);
}

#[tokio::test]
async fn shifts_reject_overlaps_and_customers() {
    let app = TestApp::spawn().await;
    let (manager, _) = app.create_staff("mgr", UserRole::Manager).await;
    let (waiter, waiter_id) = app.create_staff("walt", UserRole::Waiter).await;
    let (_, customer_id) = app.register_customer("alice").await;
    let start = shared::util::now_millis() + 24 * HOUR;

    let (status, shift) = app
        .post(
            "/api/shifts",
            Some(&manager),
            json!({ "user_id": waiter_id, "position": "floor", "start_time": start, "end_time": start + 8 * HOUR }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{shift}");
    assert_eq!(shift["user_name"], "walt");

    let (status, body) = app
        .post(
            "/api/shifts",
            Some(&manager),
            json!({ "user_id": waiter_id, "start_time": start + 4 * HOUR, "end_time": start + 10 * HOUR }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 8102);

    // Back-to-back is fine
    let (status, _) = app
        .post(
            "/api/shifts",
            Some(&manager),
            json!({ "user_id": waiter_id, "start_time": start + 8 * HOUR, "end_time": start + 12 * HOUR }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(
            "/api/shifts",
            Some(&manager),
            json!({ "user_id": customer_id, "start_time": start, "end_time": start + HOUR }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 8104);

    let (status, body) = app
        .post(
            "/api/shifts",
            Some(&manager),
            json!({ "user_id": waiter_id, "start_time": start + 50 * HOUR, "end_time": start + 49 * HOUR }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 8103);

    // Waiters can read only their own schedule
    let (status, _) = app.get("/api/shifts", Some(&waiter)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, mine) = app.get("/api/shifts/me", Some(&waiter)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn shift_update_checks_overlap_excluding_itself() {
    let app = TestApp::spawn().await;
    let (manager, _) = app.create_staff("mgr", UserRole::Manager).await;
    let (_, chef_id) = app.create_staff("chef", UserRole::Chef).await;
    let start = shared::util::now_millis() + 48 * HOUR;

    let (_, morning) = app
        .post(
            "/api/shifts",
            Some(&manager),
            json!({ "user_id": chef_id, "start_time": start, "end_time": start + 4 * HOUR }),
        )
        .await;
    let (_, evening) = app
        .post(
            "/api/shifts",
            Some(&manager),
            json!({ "user_id": chef_id, "start_time": start + 6 * HOUR, "end_time": start + 10 * HOUR }),
        )
        .await;
    let morning_id = morning["id"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/shifts/{morning_id}"),
            Some(&manager),
            json!({ "end_time": start + 5 * HOUR, "note": "extended" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["note"], "extended");

    let (status, body) = app
        .put(
            &format!("/api/shifts/{morning_id}"),
            Some(&manager),
            json!({ "end_time": start + 7 * HOUR }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 8102);

    let (_, filtered) = app
        .get(
            &format!("/api/shifts?user_id={chef_id}&from={}", start + HOUR),
            Some(&manager),
        )
        .await;
    let filtered = filtered.as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["id"], evening["id"]);

    let (status, _) = app
        .delete(&format!("/api/shifts/{morning_id}"), Some(&manager))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .get(&format!("/api/shifts/{morning_id}"), Some(&manager))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_overlapping_shifts_keep_only_one() {
    let app = TestApp::spawn().await;
    let (manager, _) = app.create_staff("mia", UserRole::Manager).await;
    let (_, waiter_id) = app.create_staff("walt", UserRole::Waiter).await;
    let start = shared::util::now_millis() + 24 * HOUR;

    let ((first, first_body), (second, second_body)) = tokio::join!(
        app.post(
            "/api/shifts",
            Some(&manager),
            json!({ "user_id": waiter_id, "start_time": start, "end_time": start + 6 * HOUR }),
        ),
        app.post(
            "/api/shifts",
            Some(&manager),
            json!({ "user_id": waiter_id, "start_time": start + 2 * HOUR, "end_time": start + 8 * HOUR }),
        ),
    );

    let mut statuses = [first, second];
    statuses.sort();
    assert_eq!(
        statuses,
        [StatusCode::CREATED, StatusCode::CONFLICT],
        "{first_body} / {second_body}"
    );

    let (_, shifts) = app
        .get(&format!("/api/shifts?user_id={waiter_id}"), Some(&manager))
        .await;
    assert_eq!(shifts.as_array().unwrap().len(), 1);
}
