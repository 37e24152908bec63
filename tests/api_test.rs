mod common;

use axum::http::StatusCode;
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn health_reports_database_status() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"], "healthy");
}

#[tokio::test]
async fn menu_crud_and_category_filter() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json(
            "/api/menu",
            json!({
                "category": "Main",
                "name_th": "ผัดกะเพรา",
                "name_en": "Pad Krapow",
                "price": 60.0,
                "tags": "spicy, basil",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Menu item added");
    let id = body["id"].as_i64().unwrap();

    app.seed_menu_item("Mango Sticky Rice", dec!(45)).await;

    let (status, body) = app.get("/api/menu").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = app.get("/api/menu?category=Main").await;
    assert_eq!(status, StatusCode::OK);
    // Seeded helper also uses "Main"; the created one is included
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m["name_en"] == "Pad Krapow"));

    let (status, body) = app.get(&format!("/api/menu/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name_en"], "Pad Krapow");
    assert_eq!(body["price"].as_f64().unwrap(), 60.0);

    let (status, body) = app.get("/api/menu/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn options_lists_meat_and_addons_side_by_side() {
    let app = TestApp::new().await;
    app.seed_meat_option("Pork", dec!(20)).await;
    app.seed_meat_option("Chicken", dec!(20)).await;
    app.seed_addon_option("Fried Egg", dec!(5)).await;

    let (status, body) = app.get("/api/options").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meat_options"].as_array().unwrap().len(), 2);
    assert_eq!(body["addon_options"].as_array().unwrap().len(), 1);
    assert_eq!(body["meat_options"][0]["name"], "Pork");
    assert_eq!(body["meat_options"][0]["extra_price"].as_f64().unwrap(), 20.0);
}

async fn place_order(app: &TestApp) -> String {
    let menu_id = app.seed_menu_item("Pad Krapow", dec!(60)).await;
    let (status, _) = app
        .post_json("/api/tables/scan", json!({ "table_no": "01" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    app.post_json(
        "/api/cart/add",
        json!({ "table_no": "01", "menu_id": menu_id, "quantity": 1 }),
    )
    .await;
    let (_, receipt) = app
        .post_json("/api/cart/checkout", json!({ "table_no": "01" }))
        .await;
    receipt["order_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn status_workflow_moves_forward_only() {
    let app = TestApp::new().await;
    let order_id = place_order(&app).await;

    // Legacy display spelling is accepted
    let (status, body) = app
        .patch_json(
            &format!("/api/orders/{}/status", order_id),
            json!({ "status": "Preparing" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Preparing");

    // The legacy admin path with the status in the URL
    let (status, body) = app
        .put_json(&format!("/api/admin/order/{}/served", order_id), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Served");

    // Backward moves are rejected
    let (status, body) = app
        .patch_json(
            &format!("/api/orders/{}/status", order_id),
            json!({ "status": "Order Placed" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Cannot move"));

    // Unknown vocabulary is a validation error, never guessed at
    let (status, _) = app
        .patch_json(
            &format!("/api/orders/{}/status", order_id),
            json!({ "status": "ready" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Same-status update is an accepted no-op
    let (status, body) = app
        .patch_json(
            &format!("/api/orders/{}/status", order_id),
            json!({ "status": "Served" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Served");
}

#[tokio::test]
async fn kitchen_table_detail_uses_legacy_item_fields() {
    let app = TestApp::new().await;
    let menu_id = app.seed_menu_item("Pad Krapow", dec!(100)).await;
    let meat_id = app.seed_meat_option("Pork", dec!(20)).await;
    let addon_id = app.seed_addon_option("Fried Egg", dec!(5)).await;

    app.post_json("/api/tables/scan", json!({ "table_no": "02" }))
        .await;
    app.post_json(
        "/api/cart/add",
        json!({
            "table_no": "02",
            "menu_id": menu_id,
            "meat_option_id": meat_id,
            "quantity": 2,
            "addon_option_ids": [addon_id],
        }),
    )
    .await;
    app.post_json("/api/cart/checkout", json!({ "table_no": "02" }))
        .await;

    let (status, orders) = app.get("/api/tables/02/orders").await;
    assert_eq!(status, StatusCode::OK);
    let item = &orders.as_array().unwrap()[0]["items"][0];
    assert_eq!(item["menu_name"], "Pad Krapow");
    assert_eq!(item["meat"], "Pork");
    assert_eq!(item["add_on"], "Fried Egg");
    assert_eq!(item["quantity"], 2);
    // (100 + 20 + 5) × 2
    assert_eq!(item["price"].as_f64().unwrap(), 250.0);
}

#[tokio::test]
async fn unknown_order_lookups_are_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app
        .get("/api/orders/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = app.get("/api/order/01?order_number=ORD-0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Without a narrowing order number an empty list is fine
    let (status, body) = app.get("/api/order/01").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn recommend_without_configuration_is_unavailable() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post_json("/api/recommend", json!({ "user_input": "something spicy" }))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}
