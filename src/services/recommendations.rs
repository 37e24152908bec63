use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::{entities::MenuItemModel, errors::ServiceError};

/// Client for the external menu recommender. The service is an opaque HTTP
/// dependency: we forward the diner's free-text request together with the
/// current menu and pass its answer straight through.
#[derive(Clone)]
pub struct RecommendationService {
    http: reqwest::Client,
    base_url: Option<String>,
}

impl RecommendationService {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    #[instrument(skip(self, menu))]
    pub async fn recommend(
        &self,
        input: RecommendInput,
        menu: Vec<MenuItemModel>,
    ) -> Result<Value, ServiceError> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            ServiceError::ServiceUnavailable("Recommendation service is not configured".to_string())
        })?;

        // Field names follow what the recommender actually reads: it bracket-
        // accesses price_starts_at and short_description, and feeds
        // full_description into its similarity text.
        let menu_data: Vec<Value> = menu
            .into_iter()
            .map(|m| {
                json!({
                    "id": m.id,
                    "name_eng": m.name_en,
                    "category": m.category,
                    "tags": m.tags.unwrap_or_default(),
                    "short_description": m.short_description.unwrap_or_default(),
                    "full_description": m.full_description.unwrap_or_default(),
                    "price_starts_at": m.price,
                })
            })
            .collect();

        let url = format!("{}/recommend", base.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .json(&json!({
                "user_input": input.user_input,
                "menu_data": menu_data,
                "table_id": input.table_id,
            }))
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("recommender: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "recommender returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("recommender: {}", e)))
    }
}

/// Input for a recommendation request
#[derive(Debug, Deserialize)]
pub struct RecommendInput {
    pub user_input: String,
    #[serde(default)]
    pub table_id: Option<String>,
}
