//! Catalog endpoints: public reads, manager-only writes, pagination.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use bistro_core::types::StaffGroup;
use bistro_integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn menu_item_listing_is_public_and_paginated() {
    let app = TestApp::spawn().await;
    let category = app.seed_category("mains").await;
    for i in 1..=7 {
        app.seed_menu_item(&format!("Dish {i:02}"), "5.00", category).await;
    }

    let (status, page) = app.get("/menu-items/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 7);
    // Default page size is 5.
    assert_eq!(page["results"].as_array().unwrap().len(), 5);
    assert_eq!(page["next"], "/menu-items/?page=2");
    assert_eq!(page["previous"], serde_json::Value::Null);

    let (_, page2) = app.get("/menu-items/?page=2", None).await;
    assert_eq!(page2["results"].as_array().unwrap().len(), 2);
    assert_eq!(page2["previous"], "/menu-items/?page=1");
    assert_eq!(page2["next"], serde_json::Value::Null);

    let (status, body) = app.get("/menu-items/?page=3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Invalid page.");

    // Garbage page_size falls back to the default instead of erroring.
    let (_, fallback) = app.get("/menu-items/?page_size=banana", None).await;
    assert_eq!(fallback["results"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn menu_item_filters_search_and_ordering() {
    let app = TestApp::spawn().await;
    let mains = app.seed_category("mains").await;
    let drinks = app.seed_category("drinks").await;
    app.seed_menu_item("Pasta", "9.00", mains).await;
    app.seed_menu_item("Pizza", "12.00", mains).await;
    app.seed_menu_item("Lemonade", "3.50", drinks).await;

    let (_, filtered) = app.get(&format!("/menu-items/?category={mains}"), None).await;
    assert_eq!(filtered["count"], 2);

    let (_, searched) = app.get("/menu-items/?search=lemon", None).await;
    assert_eq!(searched["count"], 1);
    assert_eq!(searched["results"][0]["title"], "Lemonade");

    let (_, ordered) = app.get("/menu-items/?ordering=-price", None).await;
    assert_eq!(ordered["results"][0]["title"], "Pizza");

    let (status, _) = app.get("/menu-items/?ordering=secret", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn public_reads_still_reject_invalid_tokens() {
    let app = TestApp::spawn().await;
    let category = app.seed_category("mains").await;
    let item = app.seed_menu_item("Pasta", "9.00", category).await;

    // Anonymous is fine, but a credential that is offered must be valid.
    for path in [
        "/menu-items/".to_owned(),
        format!("/menu-items/{item}"),
        "/categories/".to_owned(),
    ] {
        let (status, _) = app.get(&path, None).await;
        assert_eq!(status, StatusCode::OK, "{path}");

        let (status, body) = app.get(&path, Some("not-a-real-token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(body["detail"], "Invalid token.");
    }
}

#[tokio::test]
async fn catalog_writes_require_manager() {
    let app = TestApp::spawn().await;
    let (_, customer) = app.create_user("ada", None).await;
    let (_, manager) = app.create_user("boss", Some(StaffGroup::Manager)).await;
    let category = app.seed_category("mains").await;

    let payload = json!({"title": "Bruschetta", "price": "6.50", "category": category.as_i64()});

    let (status, _) = app.post("/menu-items/", None, payload.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.post("/menu-items/", Some(&customer), payload.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "forbidden");

    let (status, item) = app.post("/menu-items/", Some(&manager), payload).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["title"], "Bruschetta");
    assert_eq!(item["price"], "6.50");
    assert_eq!(item["featured"], false);
}

#[tokio::test]
async fn negative_price_is_rejected_without_creating_a_row() {
    let app = TestApp::spawn().await;
    let (_, manager) = app.create_user("boss", Some(StaffGroup::Manager)).await;
    let category = app.seed_category("mains").await;

    let (status, _) = app
        .post(
            "/menu-items/",
            Some(&manager),
            json!({"title": "Bad Dish", "price": -1, "category": category.as_i64()}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, page) = app.get("/menu-items/", None).await;
    assert_eq!(page["count"], 0);
}

#[tokio::test]
async fn titles_are_escaped_against_markup() {
    let app = TestApp::spawn().await;
    let (_, manager) = app.create_user("boss", Some(StaffGroup::Manager)).await;
    let category = app.seed_category("mains").await;

    let (status, item) = app
        .post(
            "/menu-items/",
            Some(&manager),
            json!({"title": "<b>Special</b>", "price": "5.00", "category": category.as_i64()}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["title"], "&lt;b&gt;Special&lt;/b&gt;");
}

#[tokio::test]
async fn partial_update_patches_a_subset() {
    let app = TestApp::spawn().await;
    let (_, manager) = app.create_user("boss", Some(StaffGroup::Manager)).await;
    let category = app.seed_category("mains").await;
    let item = app.seed_menu_item("Pasta", "9.00", category).await;

    let (status, updated) = app
        .patch(
            &format!("/menu-items/{item}"),
            Some(&manager),
            json!({"featured": true}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["featured"], true);
    assert_eq!(updated["title"], "Pasta");
    assert_eq!(updated["price"], "9.00");
}

#[tokio::test]
async fn category_lifecycle_and_delete_restrictions() {
    let app = TestApp::spawn().await;
    let (_, manager) = app.create_user("boss", Some(StaffGroup::Manager)).await;

    let (status, category) = app
        .post(
            "/categories/",
            Some(&manager),
            json!({"title": "Desserts", "slug": "desserts"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_i64().unwrap();

    // Duplicate slug is a validation error.
    let (status, _) = app
        .post(
            "/categories/",
            Some(&manager),
            json!({"title": "More Desserts", "slug": "desserts"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, categories) = app.get("/categories/", None).await;
    assert_eq!(categories.as_array().unwrap().len(), 1);

    // A referenced category cannot be deleted.
    let (status, item) = app
        .post(
            "/menu-items/",
            Some(&manager),
            json!({"title": "Cake", "price": "4.00", "category": category_id}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .delete(&format!("/categories/{category_id}"), Some(&manager))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let item_id = item["id"].as_i64().unwrap();
    let (status, _) = app
        .delete(&format!("/menu-items/{item_id}"), Some(&manager))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .delete(&format!("/categories/{category_id}"), Some(&manager))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn menu_item_referenced_by_an_order_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let (_, ada) = app.create_user("ada", None).await;
    let (_, manager) = app.create_user("boss", Some(StaffGroup::Manager)).await;
    let category = app.seed_category("mains").await;
    let item = app.seed_menu_item("Pasta", "9.00", category).await;

    app.post(
        "/cart/menu-items",
        Some(&ada),
        json!({"menu_item": item.as_i64(), "quantity": 1}),
    )
    .await;
    let (status, _) = app.post("/orders/", Some(&ada), json!({})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .delete(&format!("/menu-items/{item}"), Some(&manager))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
