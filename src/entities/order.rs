use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placed order.
///
/// The item set is immutable once the checkout transaction commits; `status`
/// is the only column that ever changes afterwards. Orders outlive the table
/// session (completing a table keeps them for billing history) and are only
/// destroyed by the destructive clear-table operation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_number: String,
    pub table_no: String,
    pub status: OrderStatus,
    pub order_date: Date,
    pub order_time: Time,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Kitchen workflow status.
///
/// Variant order is meaningful: the derived `Ord` is what the forward-only
/// transition guard compares against.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum OrderStatus {
    #[sea_orm(string_value = "orderplaced")]
    OrderPlaced,
    #[sea_orm(string_value = "preparing")]
    Preparing,
    #[sea_orm(string_value = "served")]
    Served,
    #[sea_orm(string_value = "complete")]
    Complete,
}

impl OrderStatus {
    /// Display label. The shipped mobile clients compare against these exact
    /// strings, spaces and all.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::OrderPlaced => "Order Placed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Served => "Served",
            OrderStatus::Complete => "Complete",
        }
    }

    /// Parses the status vocabulary found in the wild: the canonical compact
    /// form, the display label, and any casing of either.
    pub fn parse_client(value: &str) -> Option<Self> {
        let normalized: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "orderplaced" => Some(OrderStatus::OrderPlaced),
            "preparing" => Some(OrderStatus::Preparing),
            "served" => Some(OrderStatus::Served),
            "complete" => Some(OrderStatus::Complete),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_legacy_spellings() {
        for raw in ["Order Placed", "orderplaced", "ORDER_PLACED", "OrderPlaced"] {
            assert_eq!(OrderStatus::parse_client(raw), Some(OrderStatus::OrderPlaced));
        }
        assert_eq!(OrderStatus::parse_client("Complete"), Some(OrderStatus::Complete));
        assert_eq!(OrderStatus::parse_client("ready"), None);
    }

    #[test]
    fn variant_order_matches_workflow_progression() {
        assert!(OrderStatus::OrderPlaced < OrderStatus::Preparing);
        assert!(OrderStatus::Preparing < OrderStatus::Served);
        assert!(OrderStatus::Served < OrderStatus::Complete);
    }
}
