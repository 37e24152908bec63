//! Moom Aroi table-ordering API
//!
//! Customers scan a QR code to claim a table, build a cart from the menu,
//! and check out into kitchen orders; staff progress orders and close tables
//! out. This crate provides the HTTP surface, the domain services, and the
//! relational persistence behind all of that.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: services::AppServices,
}

/// The legacy-compatible API surface, mounted under /api by the binary.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/options", get(handlers::menu::get_options))
        .route("/recommend", post(handlers::recommend::recommend))
        .route(
            "/clear-table/{table_no}",
            delete(handlers::tables::clear_table),
        )
        .nest("/menu", handlers::menu::menu_routes())
        .nest("/tables", handlers::tables::tables_routes())
        .nest("/cart", handlers::cart::cart_routes())
        .merge(handlers::orders::orders_routes())
        .merge(handlers::billing::billing_routes())
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<Value>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Ok(Json(json!({
        "status": db_status,
        "checks": { "database": db_status },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
