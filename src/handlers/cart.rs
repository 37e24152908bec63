use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::{errors::ApiError, services::cart::AddItemInput, AppState};

/// Routes mounted at /api/cart
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_item))
        .route("/update", put(update_quantity))
        .route("/checkout", post(checkout))
        .route("/item/{id}", delete(remove_item))
        .route("/{table_no}", get(get_cart))
}

/// POST /api/cart/add
async fn add_item(
    State(state): State<AppState>,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let line = state
        .services
        .cart
        .add_item(AddItemInput {
            table_no: payload.table_no,
            menu_id: payload.menu_id,
            meat_option_id: payload.meat_option_id,
            quantity: payload.quantity,
            addon_option_ids: payload.addon_option_ids,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(line))
}

/// PUT /api/cart/update
async fn update_quantity(
    State(state): State<AppState>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .cart
        .update_quantity(payload.cart_item_id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "cart_item_id": item.id,
        "quantity": item.quantity,
        "total_price": item.total_price,
    })))
}

/// GET /api/cart/{table_no}
async fn get_cart(
    State(state): State<AppState>,
    Path(table_no): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .get_cart(&table_no)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

/// DELETE /api/cart/item/{id}
async fn remove_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cart
        .remove_item(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "message": "Item removed" })))
}

/// POST /api/cart/checkout
async fn checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let receipt = state
        .services
        .checkout
        .checkout(&payload.table_no)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(receipt))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    #[validate(length(min = 1, max = 2))]
    pub table_no: String,
    pub menu_id: i32,
    #[serde(default)]
    pub meat_option_id: Option<i32>,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[serde(default)]
    pub addon_option_ids: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    pub cart_item_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 2))]
    pub table_no: String,
}
