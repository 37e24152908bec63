pub mod billing;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod recommendations;
pub mod tables;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::AppConfig, events::EventSender};

pub use cart::CartService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use orders::OrderService;
pub use recommendations::RecommendationService;
pub use tables::TableService;

/// Every service the HTTP handlers need, wired to one pool and one event
/// channel.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub tables: Arc<TableService>,
    pub cart: Arc<CartService>,
    pub checkout: Arc<CheckoutService>,
    pub orders: Arc<OrderService>,
    pub recommendations: Arc<RecommendationService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: &AppConfig,
    ) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(db.clone(), event_sender.clone())),
            tables: Arc::new(TableService::new(
                db.clone(),
                event_sender.clone(),
                config.table_count,
            )),
            cart: Arc::new(CartService::new(
                db.clone(),
                event_sender.clone(),
                config.table_count,
            )),
            checkout: Arc::new(CheckoutService::new(
                db.clone(),
                event_sender.clone(),
                config.table_count,
            )),
            orders: Arc::new(OrderService::new(
                db,
                event_sender,
                config.table_count,
            )),
            recommendations: Arc::new(RecommendationService::new(
                config.recommendation_url.clone(),
            )),
        }
    }
}
