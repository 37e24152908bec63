use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::{errors::ApiError, AppState};

/// Routes mounted at /api/tables
pub fn tables_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tables))
        .route("/scan", post(scan_table))
        .route("/{table_no}/orders", get(table_orders))
        .route("/{table_no}/complete", post(complete_table))
}

/// POST /api/tables/scan
async fn scan_table(
    State(state): State<AppState>,
    Json(payload): Json<ScanTableRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let table = state
        .services
        .tables
        .scan_table(&payload.table_no)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Table scanned",
        "table_no": table.table_no,
        "status": table.status.label(),
        "scanned_at": table.scanned_at,
    })))
}

/// GET /api/tables: the kitchen table board
async fn list_tables(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tables = state
        .services
        .tables
        .list_tables()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(tables))
}

/// GET /api/tables/{table_no}/orders: kitchen table detail
async fn table_orders(
    State(state): State<AppState>,
    Path(table_no): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .orders
        .kitchen_orders_for_table(&table_no)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// POST /api/tables/{table_no}/complete: payment close-out, keeps history
async fn complete_table(
    State(state): State<AppState>,
    Path(table_no): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let orders_completed = state
        .services
        .tables
        .complete_table(&table_no)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Table completed",
        "orders_completed": orders_completed,
    })))
}

/// DELETE /api/clear-table/{table_no}: destructive close-out
pub async fn clear_table(
    State(state): State<AppState>,
    Path(table_no): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .tables
        .clear_table(&table_no)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "message": "Table cleared" })))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct ScanTableRequest {
    #[validate(length(min = 1, max = 2))]
    pub table_no: String,
}
