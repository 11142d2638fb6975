//! Role-gated order lifecycle: scoped visibility and the PATCH role ladder.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use bistro_core::types::StaffGroup;
use bistro_integration_tests::TestApp;
use serde_json::json;

/// Place an order for `token` containing one unit of a fresh menu item.
async fn place_order(app: &TestApp, token: &str, slug: &str) -> i64 {
    let category = app.seed_category(slug).await;
    let item = app.seed_menu_item(&format!("Dish {slug}"), "8.00", category).await;
    app.post(
        "/cart/menu-items",
        Some(token),
        json!({"menu_item": item.as_i64(), "quantity": 1}),
    )
    .await;
    let (status, order) = app.post("/orders/", Some(token), json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    order["id"].as_i64().unwrap()
}

#[tokio::test]
async fn customer_patch_is_forbidden_and_changes_nothing() {
    let app = TestApp::spawn().await;
    let (_, ada) = app.create_user("ada", None).await;
    let order_id = place_order(&app, &ada, "mains").await;

    let (status, body) = app
        .patch(
            &format!("/orders/{order_id}"),
            Some(&ada),
            json!({"status": 1}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "forbidden");

    let (_, order) = app.get(&format!("/orders/{order_id}"), Some(&ada)).await;
    assert_eq!(order["status"], 0);
}

#[tokio::test]
async fn crew_patch_without_status_is_missing_field() {
    let app = TestApp::spawn().await;
    let (_, ada) = app.create_user("ada", None).await;
    let (crew_id, crew) = app.create_user("joe", Some(StaffGroup::DeliveryCrew)).await;
    let order_id = place_order(&app, &ada, "mains").await;

    let (status, body) = app
        .patch(
            &format!("/orders/{order_id}"),
            Some(&crew),
            json!({"delivery_crew": crew_id.as_i64()}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "status required");

    let (_, order) = app.get(&format!("/orders/{order_id}"), Some(&ada)).await;
    assert_eq!(order["status"], 0);
    assert_eq!(order["delivery_crew"], serde_json::Value::Null);
}

#[tokio::test]
async fn crew_may_set_status_on_unassigned_orders_and_other_fields_are_ignored() {
    let app = TestApp::spawn().await;
    let (_, ada) = app.create_user("ada", None).await;
    let (crew_id, crew) = app.create_user("joe", Some(StaffGroup::DeliveryCrew)).await;
    let order_id = place_order(&app, &ada, "mains").await;

    // The order is not assigned to joe; the update is accepted anyway, and
    // the delivery_crew field in the patch is ignored rather than applied.
    let (status, order) = app
        .patch(
            &format!("/orders/{order_id}"),
            Some(&crew),
            json!({"status": 1, "delivery_crew": crew_id.as_i64()}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], 1);
    assert_eq!(order["delivery_crew"], serde_json::Value::Null);
}

#[tokio::test]
async fn status_accepts_out_of_enum_integers() {
    let app = TestApp::spawn().await;
    let (_, ada) = app.create_user("ada", None).await;
    let (_, crew) = app.create_user("joe", Some(StaffGroup::DeliveryCrew)).await;
    let order_id = place_order(&app, &ada, "mains").await;

    let (status, order) = app
        .patch(
            &format!("/orders/{order_id}"),
            Some(&crew),
            json!({"status": 42}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], 42);
}

#[tokio::test]
async fn manager_patch_assigns_crew_and_leaves_absent_fields_alone() {
    let app = TestApp::spawn().await;
    let (_, ada) = app.create_user("ada", None).await;
    let (crew_id, _) = app.create_user("joe", Some(StaffGroup::DeliveryCrew)).await;
    let (_, boss) = app.create_user("boss", Some(StaffGroup::Manager)).await;
    let order_id = place_order(&app, &ada, "mains").await;

    let (status, order) = app
        .patch(
            &format!("/orders/{order_id}"),
            Some(&boss),
            json!({"delivery_crew": crew_id.as_i64()}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["delivery_crew"], crew_id.as_i64());
    assert_eq!(order["status"], 0);

    // Total is never recomputed on update.
    assert_eq!(order["total"], "8.00");
}

#[tokio::test]
async fn manager_patch_with_unknown_crew_is_not_found() {
    let app = TestApp::spawn().await;
    let (_, ada) = app.create_user("ada", None).await;
    let (_, boss) = app.create_user("boss", Some(StaffGroup::Manager)).await;
    let order_id = place_order(&app, &ada, "mains").await;

    let (status, body) = app
        .patch(
            &format!("/orders/{order_id}"),
            Some(&boss),
            json!({"delivery_crew": 9999}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Not found.");

    let (_, order) = app.get(&format!("/orders/{order_id}"), Some(&ada)).await;
    assert_eq!(order["delivery_crew"], serde_json::Value::Null);
}

#[tokio::test]
async fn listing_is_scoped_by_role() {
    let app = TestApp::spawn().await;
    let (_, ada) = app.create_user("ada", None).await;
    let (_, bob) = app.create_user("bob", None).await;
    let (crew_id, crew) = app.create_user("joe", Some(StaffGroup::DeliveryCrew)).await;
    let (_, boss) = app.create_user("boss", Some(StaffGroup::Manager)).await;

    let ada_order = place_order(&app, &ada, "mains").await;
    let bob_order = place_order(&app, &bob, "sides").await;

    app.patch(
        &format!("/orders/{ada_order}"),
        Some(&boss),
        json!({"delivery_crew": crew_id.as_i64()}),
    )
    .await;

    // Manager sees everything.
    let (_, all) = app.get("/orders/", Some(&boss)).await;
    assert_eq!(all["count"], 2);

    // Crew sees only assigned orders.
    let (_, assigned) = app.get("/orders/", Some(&crew)).await;
    assert_eq!(assigned["count"], 1);
    assert_eq!(assigned["results"][0]["id"], ada_order);

    // Customers see only their own.
    let (_, own) = app.get("/orders/", Some(&bob)).await;
    assert_eq!(own["count"], 1);
    assert_eq!(own["results"][0]["id"], bob_order);

    // Retrieve follows the same scope: bob cannot see ada's order.
    let (status, _) = app.get(&format!("/orders/{ada_order}"), Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_and_ordering() {
    let app = TestApp::spawn().await;
    let (_, ada) = app.create_user("ada", None).await;
    let (_, bob) = app.create_user("bob", None).await;
    let (_, boss) = app.create_user("boss", Some(StaffGroup::Manager)).await;

    let ada_order = place_order(&app, &ada, "mains").await;
    place_order(&app, &bob, "sides").await;

    app.patch(
        &format!("/orders/{ada_order}"),
        Some(&boss),
        json!({"status": 1}),
    )
    .await;

    let (_, delivered) = app.get("/orders/?status=1", Some(&boss)).await;
    assert_eq!(delivered["count"], 1);
    assert_eq!(delivered["results"][0]["id"], ada_order);

    let (_, by_name) = app.get("/orders/?search=bo", Some(&boss)).await;
    assert_eq!(by_name["count"], 1);

    let (_, by_status) = app.get("/orders/?ordering=-status", Some(&boss)).await;
    assert_eq!(by_status["results"][0]["id"], ada_order);

    let (status, body) = app.get("/orders/?ordering=user", Some(&boss)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "cannot order by user");
}

#[tokio::test]
async fn scoped_delete_removes_order_and_its_lines() {
    let app = TestApp::spawn().await;
    let (_, ada) = app.create_user("ada", None).await;
    let (_, bob) = app.create_user("bob", None).await;
    let order_id = place_order(&app, &ada, "mains").await;

    // Outside the caller's scope the order does not exist.
    let (status, _) = app.delete(&format!("/orders/{order_id}"), Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/orders/{order_id}"), Some(&ada)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/orders/{order_id}"), Some(&ada)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_changes_take_effect_on_the_next_request() {
    let app = TestApp::spawn().await;
    let (_, ada) = app.create_user("ada", None).await;
    let (crew_id, crew) = app.create_user("joe", Some(StaffGroup::DeliveryCrew)).await;
    let (_, boss) = app.create_user("boss", Some(StaffGroup::Manager)).await;
    let order_id = place_order(&app, &ada, "mains").await;

    let (status, _) = app
        .patch(&format!("/orders/{order_id}"), Some(&crew), json!({"status": 1}))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Membership is re-read per request, so removal demotes joe immediately.
    let (status, _) = app
        .delete(&format!("/groups/delivery-crew/users/{crew_id}"), Some(&boss))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .patch(&format!("/orders/{order_id}"), Some(&crew), json!({"status": 0}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
