use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::{errors::ApiError, services::catalog::CreateMenuItemInput, AppState};

/// Routes mounted at /api/menu
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_menu).post(create_menu_item))
        .route("/{id}", get(get_menu_item))
}

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
}

/// GET /api/menu?category=
async fn list_menu(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .catalog
        .list_menu(query.category)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(items))
}

/// GET /api/menu/{id}
async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .catalog
        .get_menu_item(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(item))
}

/// POST /api/menu (admin insert)
async fn create_menu_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateMenuItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .catalog
        .create_menu_item(CreateMenuItemInput {
            category: payload.category,
            name_th: payload.name_th,
            name_en: payload.name_en,
            short_description: payload.short_description,
            full_description: payload.full_description,
            price: payload.price,
            image_url: payload.image_url,
            tags: payload.tags,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({
        "message": "Menu item added",
        "id": item.id,
    })))
}

/// GET /api/options
pub async fn get_options(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let options = state
        .services
        .catalog
        .list_options()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(options))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMenuItemRequest {
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(length(min = 1))]
    pub name_th: String,
    #[validate(length(min = 1))]
    pub name_en: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub tags: Option<String>,
}
