mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::TestApp;
use moomaroi_api::{
    entities::{AddonOption, Cart, CartItem, Order, OrderItem, OrderItemAddon},
    errors::ServiceError,
};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::json;

async fn occupy(app: &TestApp, table_no: &str) {
    let (status, _) = app
        .post_json("/api/tables/scan", json!({ "table_no": table_no }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn scan_order_checkout_complete_round_trip() {
    let app = TestApp::new().await;
    let menu_id = app.seed_menu_item("Pad Krapow", dec!(60)).await;

    occupy(&app, "01").await;

    let (status, _) = app
        .post_json(
            "/api/cart/add",
            json!({ "table_no": "01", "menu_id": menu_id, "quantity": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, cart) = app.get("/api/cart/01").await;
    assert_eq!(cart["grand_total"].as_f64().unwrap(), 120.0);

    let (status, receipt) = app
        .post_json("/api/cart/checkout", json!({ "table_no": "01" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(receipt["order_number"]
        .as_str()
        .unwrap()
        .starts_with("ORD-"));
    assert_eq!(receipt["total_price"].as_f64().unwrap(), 120.0);
    let order_id = receipt["order_id"].as_str().unwrap().to_string();

    // Cart is consumed
    let (status, _) = app.get("/api/cart/01").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Checkout does not release the table
    let (_, tables) = app.get("/api/tables").await;
    let table = tables
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["table_no"] == "01")
        .unwrap()
        .clone();
    assert_eq!(table["status"], "Occupied");

    // Status tracker shows the fresh order
    let (_, body) = app.get("/api/order-status/01").await;
    assert_eq!(body["orders"][0]["status"], "Order Placed");
    assert_eq!(body["orders"][0]["total_items"], 2);

    // Customer order-details lookup by order number
    let number = receipt["order_number"].as_str().unwrap();
    let (status, order) = app
        .get(&format!("/api/order/01?order_number={}", number))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["grand_total"].as_f64().unwrap(), 120.0);
    assert_eq!(order["items"][0]["menu_name"], "Pad Krapow");
    assert_eq!(order["items"][0]["total_price"].as_f64().unwrap(), 120.0);

    // Complete the table: order survives as history, table frees up
    let (status, _) = app.post_json("/api/tables/01/complete", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, order) = app.get(&format!("/api/orders/{}", order_id)).await;
    assert_eq!(order["status"], "Complete");

    let (_, tables) = app.get("/api/tables").await;
    let table = tables
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["table_no"] == "01")
        .unwrap()
        .clone();
    assert_eq!(table["status"], "Available");
}

#[tokio::test]
async fn checkout_preserves_quoted_totals_with_options() {
    let app = TestApp::new().await;
    let menu_id = app.seed_menu_item("Pad Krapow", dec!(100)).await;
    let meat_id = app.seed_meat_option("Pork", dec!(20)).await;
    let addon_a = app.seed_addon_option("Fried Egg", dec!(5)).await;
    let addon_b = app.seed_addon_option("Extra Rice", dec!(3)).await;

    occupy(&app, "02").await;
    app.post_json(
        "/api/cart/add",
        json!({
            "table_no": "02",
            "menu_id": menu_id,
            "meat_option_id": meat_id,
            "quantity": 2,
            "addon_option_ids": [addon_a, addon_b],
        }),
    )
    .await;

    let (status, receipt) = app
        .post_json("/api/cart/checkout", json!({ "table_no": "02" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    // Exactly what the cart quoted: (100 + 20 + 5 + 3) × 2
    assert_eq!(receipt["total_price"].as_f64().unwrap(), 256.0);

    let order_id = receipt["order_id"].as_str().unwrap();
    let (_, order) = app.get(&format!("/api/orders/{}", order_id)).await;
    assert_eq!(order["grand_total"].as_f64().unwrap(), 256.0);
    assert_eq!(order["items"][0]["total_price"].as_f64().unwrap(), 256.0);
    assert_eq!(order["items"][0]["meat_option"], "Pork");
    assert_eq!(order["items"][0]["addons"], "Fried Egg, Extra Rice");
}

#[tokio::test]
async fn checkout_requires_a_non_empty_cart() {
    let app = TestApp::new().await;
    let menu_id = app.seed_menu_item("Tom Yum", dec!(80)).await;

    // No cart at all
    let (status, _) = app
        .post_json("/api/cart/checkout", json!({ "table_no": "03" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Cart exists but was emptied
    occupy(&app, "03").await;
    let (_, line) = app
        .post_json(
            "/api/cart/add",
            json!({ "table_no": "03", "menu_id": menu_id, "quantity": 1 }),
        )
        .await;
    let cart_item_id = line["cart_item_id"].as_str().unwrap();
    app.delete(&format!("/api/cart/item/{}", cart_item_id)).await;

    let (status, body) = app
        .post_json("/api/cart/checkout", json!({ "table_no": "03" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn failed_checkout_leaves_no_partial_order_and_keeps_the_cart() {
    let app = TestApp::new().await;
    let menu_id = app.seed_menu_item("Pad Krapow", dec!(60)).await;
    let addon_id = app.seed_addon_option("Fried Egg", dec!(5)).await;

    occupy(&app, "04").await;
    app.post_json(
        "/api/cart/add",
        json!({ "table_no": "04", "menu_id": menu_id, "quantity": 1 }),
    )
    .await;
    app.post_json(
        "/api/cart/add",
        json!({ "table_no": "04", "menu_id": menu_id, "quantity": 1, "addon_option_ids": [addon_id] }),
    )
    .await;

    // Sabotage the second line: its addon reference data disappears, so the
    // copy step fails mid-transaction.
    AddonOption::delete_by_id(addon_id)
        .exec(&*app.state.db)
        .await
        .unwrap();

    let result = app.state.services.checkout.checkout("04").await;
    assert_matches!(result, Err(ServiceError::InternalError(_)));

    // All-or-nothing: nothing of the order persists...
    assert!(Order::find().all(&*app.state.db).await.unwrap().is_empty());
    assert!(OrderItem::find()
        .all(&*app.state.db)
        .await
        .unwrap()
        .is_empty());
    assert!(OrderItemAddon::find()
        .all(&*app.state.db)
        .await
        .unwrap()
        .is_empty());

    // ...and the cart is untouched.
    assert_eq!(Cart::find().all(&*app.state.db).await.unwrap().len(), 1);
    assert_eq!(CartItem::find().all(&*app.state.db).await.unwrap().len(), 2);
}
