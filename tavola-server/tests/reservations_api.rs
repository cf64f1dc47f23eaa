mod common;

use common::{TestApp, future_date};
use http::StatusCode;
use serde_json::{Value, json};
use shared::models::UserRole;

fn slot<'a>(slots: &'a Value, time: &str) -> &'a Value {
    slots
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["time"] == time)
        .unwrap_or_else(|| panic!("slot {time} missing"))
}

/// Two tables: #1 seats 2, #2 seats 4
async fn seeded() -> (TestApp, i64, i64) {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let small = app.create_table(&admin, 1, 2).await;
    let large = app.create_table(&admin, 2, 4).await;
    (app, small, large)
}

#[tokio::test]
async fn availability_lists_every_slot() {
    let (app, _, _) = seeded().await;
    let date = future_date(3);

    let (status, slots) = app
        .get(&format!("/api/reservations/availability?date={date}&party_size=2"), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{slots}");
    let slots = slots.as_array().unwrap();
    assert_eq!(slots.len(), 22);
    assert_eq!(slots[0]["time"], "11:00");
    assert_eq!(slots[21]["time"], "21:30");
    assert!(slots.iter().all(|s| s["available_tables"] == 2));

    let (_, big_party) = app
        .get(&format!("/api/reservations/availability?date={date}&party_size=6"), None)
        .await;
    assert!(big_party.as_array().unwrap().iter().all(|s| s["available"] == false));
}

#[tokio::test]
async fn availability_rejects_bad_input() {
    let (app, _, _) = seeded().await;

    let past = future_date(-1);
    let (status, body) = app
        .get(&format!("/api/reservations/availability?date={past}&party_size=2"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5006);

    let date = future_date(1);
    let (status, _) = app
        .get(&format!("/api/reservations/availability?date={date}&party_size=0"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn auto_assign_picks_smallest_table_until_full() {
    let (app, small, large) = seeded().await;
    let (alice, alice_id) = app.register_customer("alice").await;
    let (bob, _) = app.register_customer("bob").await;
    let (carol, _) = app.register_customer("carol").await;
    let date = future_date(5);
    let booking = json!({ "party_size": 2, "date": date, "time": "19:00" });

    let (status, first) = app.post("/api/reservations", Some(&alice), booking.clone()).await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["table_id"], small);
    assert_eq!(first["status"], "PENDING");
    assert_eq!(first["user_id"], alice_id);
    // Contact details come from the profile
    assert_eq!(first["customer_name"], "Guest alice");
    assert_eq!(first["customer_email"], "alice@example.com");

    let (status, second) = app.post("/api/reservations", Some(&bob), booking.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["table_id"], large);

    let (status, body) = app.post("/api/reservations", Some(&carol), booking).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 5003);

    let (_, slots) = app
        .get(&format!("/api/reservations/availability?date={date}&party_size=2"), None)
        .await;
    assert_eq!(slot(&slots, "19:00")["available"], false);
    assert_eq!(slot(&slots, "19:30")["available_tables"], 2);
}

#[tokio::test]
async fn requested_table_checks() {
    let (app, small, large) = seeded().await;
    let (alice, _) = app.register_customer("alice").await;
    let date = future_date(2);

    let (status, body) = app
        .post(
            "/api/reservations",
            Some(&alice),
            json!({ "party_size": 4, "date": date, "time": "18:00", "table_id": small }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5004);

    let request = json!({ "party_size": 3, "date": date, "time": "18:00", "table_id": large });
    let (status, _) = app.post("/api/reservations", Some(&alice), request.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/api/reservations", Some(&alice), request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 5002);

    let (status, body) = app
        .post(
            "/api/reservations",
            Some(&alice),
            json!({ "party_size": 2, "date": date, "time": "18:00", "table_id": 999 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 7001);
}

#[tokio::test]
async fn create_rejects_past_dates_and_off_grid_times() {
    let (app, _, _) = seeded().await;
    let (alice, _) = app.register_customer("alice").await;

    let (status, body) = app
        .post(
            "/api/reservations",
            Some(&alice),
            json!({ "party_size": 2, "date": future_date(-2), "time": "19:00" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5006);

    for time in ["19:15", "10:30", "22:00", "dinner"] {
        let (status, body) = app
            .post(
                "/api/reservations",
                Some(&alice),
                json!({ "party_size": 2, "date": future_date(2), "time": time }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "time {time}");
        assert_eq!(body["code"], 5005);
    }
}

#[tokio::test]
async fn staff_booking_needs_a_guest_name() {
    let (app, _, _) = seeded().await;
    let (waiter, _) = app.create_staff("walt", UserRole::Waiter).await;
    let date = future_date(4);

    let (status, body) = app
        .post(
            "/api/reservations",
            Some(&waiter),
            json!({ "party_size": 2, "date": date, "time": "12:00" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7);

    let (status, body) = app
        .post(
            "/api/reservations",
            Some(&waiter),
            json!({ "party_size": 2, "date": date, "time": "12:00", "customer_name": "Walk-in Smith" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["user_id"], Value::Null);
}

#[tokio::test]
async fn customers_only_see_their_own_reservations() {
    let (app, _, _) = seeded().await;
    let (alice, _) = app.register_customer("alice").await;
    let (bob, _) = app.register_customer("bob").await;
    let (waiter, _) = app.create_staff("walt", UserRole::Waiter).await;
    let date = future_date(6);

    let (_, mine) = app
        .post(
            "/api/reservations",
            Some(&alice),
            json!({ "party_size": 2, "date": date, "time": "13:00" }),
        )
        .await;
    app.post(
        "/api/reservations",
        Some(&bob),
        json!({ "party_size": 2, "date": date, "time": "13:30" }),
    )
    .await;

    let (_, list) = app.get("/api/reservations", Some(&alice)).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, all) = app.get(&format!("/api/reservations?date={date}"), Some(&waiter)).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let id = mine["id"].as_i64().unwrap();
    let (status, _) = app.get(&format!("/api/reservations/{id}"), Some(&bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&format!("/api/reservations/{id}"), Some(&waiter)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn cancel_frees_the_slot_and_locks_owner_edits() {
    let (app, small, _) = seeded().await;
    let (alice, _) = app.register_customer("alice").await;
    let (bob, _) = app.register_customer("bob").await;
    let date = future_date(7);
    let request = json!({ "party_size": 2, "date": date, "time": "20:00", "table_id": small });

    let (_, booked) = app.post("/api/reservations", Some(&alice), request.clone()).await;
    let id = booked["id"].as_i64().unwrap();

    let (status, _) = app
        .post(&format!("/api/reservations/{id}/cancel"), Some(&bob), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, cancelled) = app
        .post(&format!("/api/reservations/{id}/cancel"), Some(&alice), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "CANCELLED");

    let (status, _) = app.post("/api/reservations", Some(&bob), request).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .put(
            &format!("/api/reservations/{id}"),
            Some(&alice),
            json!({ "time": "20:30" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5007);
}

#[tokio::test]
async fn owner_update_keeps_table_when_it_still_fits() {
    let (app, small, large) = seeded().await;
    let (alice, _) = app.register_customer("alice").await;
    let date = future_date(8);

    let (_, booked) = app
        .post(
            "/api/reservations",
            Some(&alice),
            json!({ "party_size": 2, "date": date, "time": "12:30" }),
        )
        .await;
    let id = booked["id"].as_i64().unwrap();
    assert_eq!(booked["table_id"], small);

    let (status, moved) = app
        .put(&format!("/api/reservations/{id}"), Some(&alice), json!({ "time": "13:00" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{moved}");
    assert_eq!(moved["time"], "13:00");
    assert_eq!(moved["table_id"], small);

    let (status, grown) = app
        .put(&format!("/api/reservations/{id}"), Some(&alice), json!({ "party_size": 4 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grown["table_id"], large);
}

#[tokio::test]
async fn status_changes_and_delete_need_manage_permission() {
    let (app, _, _) = seeded().await;
    let (alice, _) = app.register_customer("alice").await;
    let (chef, _) = app.create_staff("chef", UserRole::Chef).await;
    let (waiter, _) = app.create_staff("walt", UserRole::Waiter).await;

    let (_, booked) = app
        .post(
            "/api/reservations",
            Some(&alice),
            json!({ "party_size": 2, "date": future_date(9), "time": "14:00" }),
        )
        .await;
    let id = booked["id"].as_i64().unwrap();
    let path = format!("/api/reservations/{id}/status");

    let (status, _) = app.patch(&path, Some(&alice), json!({ "status": "CONFIRMED" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.patch(&path, Some(&chef), json!({ "status": "CONFIRMED" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.patch(&path, Some(&waiter), json!({ "status": "SEATED" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "SEATED");

    let (status, _) = app.delete(&format!("/api/reservations/{id}"), Some(&alice)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&format!("/api/reservations/{id}"), Some(&waiter)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/api/reservations/{id}"), Some(&waiter)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_bookings_for_one_table_conflict_cleanly() {
    let (app, small, _) = seeded().await;
    let (alice, _) = app.register_customer("alice").await;
    let (bob, _) = app.register_customer("bob").await;
    let date = future_date(6);

    for time in ["18:00", "19:00", "20:00", "21:00"] {
        let booking = json!({ "party_size": 2, "date": date, "time": time, "table_id": small });
        let ((first, first_body), (second, second_body)) = tokio::join!(
            app.post("/api/reservations", Some(&alice), booking.clone()),
            app.post("/api/reservations", Some(&bob), booking.clone()),
        );

        let mut statuses = [first, second];
        statuses.sort();
        assert_eq!(
            statuses,
            [StatusCode::CREATED, StatusCode::CONFLICT],
            "{time}: {first_body} / {second_body}"
        );
        let loser = if first == StatusCode::CONFLICT { &first_body } else { &second_body };
        assert_eq!(loser["code"], 5002);
    }
}

#[tokio::test]
async fn reactivating_a_cancelled_booking_on_a_retaken_slot_conflicts() {
    let (app, small, _) = seeded().await;
    let admin = app.admin_token().await;
    let (alice, _) = app.register_customer("alice").await;
    let (bob, _) = app.register_customer("bob").await;
    let date = future_date(4);
    let booking = json!({ "party_size": 2, "date": date, "time": "19:30", "table_id": small });

    let (_, first) = app.post("/api/reservations", Some(&alice), booking.clone()).await;
    let id = first["id"].as_i64().unwrap();
    let (status, _) = app
        .post(&format!("/api/reservations/{id}/cancel"), Some(&alice), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.post("/api/reservations", Some(&bob), booking).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .patch(
            &format!("/api/reservations/{id}/status"),
            Some(&admin),
            json!({ "status": "CONFIRMED" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["code"], 5002);

    // Moving it to a terminal status does not touch the slot
    let (status, body) = app
        .patch(
            &format!("/api/reservations/{id}/status"),
            Some(&admin),
            json!({ "status": "NO_SHOW" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}
