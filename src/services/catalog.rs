use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    entities::{
        addon_option, meat_option, menu_item, AddonOption, AddonOptionModel, MeatOption,
        MeatOptionModel, MenuItem, MenuItemModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Read-mostly access to the menu and option reference data.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Menu items, optionally filtered by category.
    pub async fn list_menu(
        &self,
        category: Option<String>,
    ) -> Result<Vec<MenuItemModel>, ServiceError> {
        let mut query = MenuItem::find().order_by_asc(menu_item::Column::Id);
        if let Some(category) = category.filter(|c| !c.trim().is_empty()) {
            query = query.filter(menu_item::Column::Category.eq(category.trim().to_string()));
        }
        Ok(query.all(&*self.db).await?)
    }

    pub async fn get_menu_item(&self, id: i32) -> Result<MenuItemModel, ServiceError> {
        MenuItem::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Menu item {} not found", id)))
    }

    /// The flat option lists the selection screen renders.
    pub async fn list_options(&self) -> Result<OptionLists, ServiceError> {
        let meat_options = MeatOption::find()
            .order_by_asc(meat_option::Column::Id)
            .all(&*self.db)
            .await?;
        let addon_options = AddonOption::find()
            .order_by_asc(addon_option::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(OptionLists {
            meat_options,
            addon_options,
        })
    }

    /// Admin insert of a new menu item.
    #[instrument(skip(self, input))]
    pub async fn create_menu_item(
        &self,
        input: CreateMenuItemInput,
    ) -> Result<MenuItemModel, ServiceError> {
        if input.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price must not be negative".to_string(),
            ));
        }

        let item = menu_item::ActiveModel {
            category: Set(input.category),
            name_th: Set(input.name_th),
            name_en: Set(input.name_en),
            short_description: Set(input.short_description),
            full_description: Set(input.full_description),
            price: Set(input.price.round_dp(2)),
            image_url: Set(input.image_url),
            tags: Set(input.tags),
            ..Default::default()
        };

        let item = item.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::MenuItemCreated { menu_id: item.id })
            .await;

        info!("Created menu item {} ({})", item.id, item.name_en);
        Ok(item)
    }
}

/// Input for creating a menu item
#[derive(Debug, Deserialize)]
pub struct CreateMenuItemInput {
    pub category: String,
    pub name_th: String,
    pub name_en: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub tags: Option<String>,
}

/// Meat and addon options side by side, as `/api/options` returns them.
#[derive(Debug, Serialize)]
pub struct OptionLists {
    pub meat_options: Vec<MeatOptionModel>,
    pub addon_options: Vec<AddonOptionModel>,
}
