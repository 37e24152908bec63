use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Addon reference data (extra toppings, fried egg, extra rice, ...).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "addon_options")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub extra_price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_item_addon::Entity")]
    CartItemAddons,
}

impl Related<super::cart_item_addon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItemAddons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
