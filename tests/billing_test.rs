mod common;

use axum::http::StatusCode;
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::json;

async fn occupy(app: &TestApp, table_no: &str) {
    let (status, _) = app
        .post_json("/api/tables/scan", json!({ "table_no": table_no }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

async fn place_order(app: &TestApp, table_no: &str, menu_id: i32, quantity: i32) {
    let (status, _) = app
        .post_json(
            "/api/cart/add",
            json!({ "table_no": table_no, "menu_id": menu_id, "quantity": quantity }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post_json("/api/cart/checkout", json!({ "table_no": table_no }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn order_bill_applies_seven_percent_vat() {
    let app = TestApp::new().await;
    let menu_id = app.seed_menu_item("Pad Krapow", dec!(50)).await;

    occupy(&app, "01").await;
    place_order(&app, "01", menu_id, 2).await;

    let (status, bills) = app.get("/api/bill/01").await;
    assert_eq!(status, StatusCode::OK);
    let bill = &bills.as_array().unwrap()[0];
    assert_eq!(bill["subtotal"].as_f64().unwrap(), 100.0);
    assert_eq!(bill["vat"].as_f64().unwrap(), 7.0);
    assert_eq!(bill["total"].as_f64().unwrap(), 107.0);
    assert_eq!(bill["items"][0]["menu_name"], "Pad Krapow");
    assert_eq!(bill["items"][0]["total_price"].as_f64().unwrap(), 100.0);
}

#[tokio::test]
async fn table_summary_sums_vat_inclusive_order_totals() {
    let app = TestApp::new().await;
    let menu_id = app.seed_menu_item("Pad Krapow", dec!(50)).await;

    occupy(&app, "02").await;
    place_order(&app, "02", menu_id, 2).await; // 100.00 → 107.00
    place_order(&app, "02", menu_id, 1).await; // 50.00 → 53.50

    let (status, summary) = app.get("/api/bills-summary/02").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["table_no"], "02");
    assert_eq!(summary["orders"].as_array().unwrap().len(), 2);
    assert_eq!(summary["grand_total"].as_f64().unwrap(), 160.5);
}

#[tokio::test]
async fn bill_for_table_without_orders_is_empty() {
    let app = TestApp::new().await;

    let (status, bills) = app.get("/api/bill/03").await;
    assert_eq!(status, StatusCode::OK);
    assert!(bills.as_array().unwrap().is_empty());

    let (status, summary) = app.get("/api/bills-summary/03").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["grand_total"].as_f64().unwrap(), 0.0);
}
