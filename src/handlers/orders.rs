use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, patch, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::handlers::common::{map_service_error, success_response};
use crate::{
    entities::OrderStatus,
    errors::ApiError,
    AppState,
};

/// Order read and status routes, mounted directly under /api
pub fn orders_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(patch_order_status))
        .route("/order/{table_no}", get(orders_for_table))
        .route("/order-status/{table_no}", get(order_status_for_table))
        .route("/admin/order/{order_id}/{status}", put(admin_set_order_status))
}

/// GET /api/orders
async fn list_orders(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .orders
        .list_orders()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// GET /api/orders/{id}
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub order_number: Option<String>,
}

/// GET /api/order/{table_no}?order_number=
///
/// With `order_number` the body is the single matching order; without it,
/// the list of the table's orders.
async fn orders_for_table(
    State(state): State<AppState>,
    Path(table_no): Path<String>,
    Query(query): Query<OrderQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let narrowed = query.order_number.is_some();
    let mut orders = state
        .services
        .orders
        .orders_for_table(&table_no, query.order_number.as_deref())
        .await
        .map_err(map_service_error)?;

    if narrowed {
        Ok(success_response(orders.remove(0)))
    } else {
        Ok(success_response(orders))
    }
}

/// GET /api/order-status/{table_no}
async fn order_status_for_table(
    State(state): State<AppState>,
    Path(table_no): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .orders
        .order_status_for_table(&table_no)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "orders": orders })))
}

/// PATCH /api/orders/{id}/status
async fn patch_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    apply_status(&state, id, &payload.status).await
}

/// PUT /api/admin/order/{order_id}/{status}, the legacy admin path with the
/// status in the URL
async fn admin_set_order_status(
    State(state): State<AppState>,
    Path((order_id, status)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    apply_status(&state, order_id, &status).await
}

async fn apply_status(
    state: &AppState,
    order_id: Uuid,
    raw_status: &str,
) -> Result<axum::response::Response, ApiError> {
    let status = OrderStatus::parse_client(raw_status).ok_or_else(|| {
        ApiError::ValidationError(format!("Invalid order status: {}", raw_status))
    })?;

    let order = state
        .services
        .orders
        .update_status(order_id, status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "id": order.id,
        "order_number": order.order_number,
        "status": order.status.label(),
    })))
}

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}
