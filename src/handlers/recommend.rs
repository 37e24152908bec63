use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use validator::Validate;

use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::{errors::ApiError, services::recommendations::RecommendInput, AppState};

/// POST /api/recommend: proxy to the external recommender with the current
/// menu attached
pub async fn recommend(
    State(state): State<AppState>,
    Json(payload): Json<RecommendRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let menu = state
        .services
        .catalog
        .list_menu(None)
        .await
        .map_err(map_service_error)?;

    let result = state
        .services
        .recommendations
        .recommend(
            RecommendInput {
                user_input: payload.user_input,
                table_id: payload.table_id,
            },
            menu,
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(result))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(length(min = 1))]
    pub user_input: String,
    #[serde(default)]
    pub table_id: Option<String>,
}
