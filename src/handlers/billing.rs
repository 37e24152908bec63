use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};

use crate::handlers::common::{map_service_error, success_response};
use crate::{errors::ApiError, services::billing, AppState};

/// Billing view routes, mounted directly under /api
pub fn billing_routes() -> Router<AppState> {
    Router::new()
        .route("/bill/{table_no}", get(table_bills))
        .route("/bills-summary/{table_no}", get(table_bill_summary))
}

/// GET /api/bill/{table_no}: one priced bill per order
async fn table_bills(
    State(state): State<AppState>,
    Path(table_no): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, bills) = state
        .services
        .orders
        .bills_for_table(&table_no)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(bills))
}

/// GET /api/bills-summary/{table_no}: VAT-inclusive rollup
async fn table_bill_summary(
    State(state): State<AppState>,
    Path(table_no): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (table_no, bills) = state
        .services
        .orders
        .bills_for_table(&table_no)
        .await
        .map_err(map_service_error)?;

    let summary = billing::summarize_table(table_no, &bills);
    Ok(success_response(summary))
}
