use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Addon attached to a cart line, with the extra price frozen at add time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_item_addons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cart_item_id: Uuid,
    pub addon_option_id: i32,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cart_item::Entity",
        from = "Column::CartItemId",
        to = "super::cart_item::Column::Id"
    )]
    CartItem,
    #[sea_orm(
        belongs_to = "super::addon_option::Entity",
        from = "Column::AddonOptionId",
        to = "super::addon_option::Column::Id"
    )]
    AddonOption,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItem.def()
    }
}

impl Related<super::addon_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AddonOption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
