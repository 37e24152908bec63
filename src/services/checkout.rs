use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        cart, cart_item, cart_item_addon, order, order_item, order_item_addon, AddonOption, Cart,
        CartItem, CartItemAddon, MeatOption, OrderStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::tables::normalize_table_no,
};

/// What checkout hands back to the client.
#[derive(Debug, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: Uuid,
    pub order_number: String,
    pub total_price: Decimal,
}

/// Converts a table's cart into an order, atomically.
///
/// Everything (option-name resolution, order insert, line copies, cart
/// deletion) happens inside one transaction. A failure at any step leaves
/// no order rows behind and the cart untouched.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    table_count: u32,
}

impl CheckoutService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>, table_count: u32) -> Self {
        Self {
            db,
            event_sender,
            table_count,
        }
    }

    /// Checks out the cart for a table.
    ///
    /// Prices are carried over from the cart snapshots, never re-read from
    /// the catalog: the stored per-unit price is the line total divided by
    /// its quantity, split into the dish price (`price_each`) and the
    /// per-line addon charges. The order total therefore equals the cart
    /// grand total exactly. The table stays Occupied; payment, not checkout,
    /// releases it.
    #[instrument(skip(self))]
    pub async fn checkout(&self, table_no: &str) -> Result<CheckoutReceipt, ServiceError> {
        let table_no = normalize_table_no(table_no, self.table_count)?;
        let txn = self.db.begin().await?;

        let cart = Cart::find()
            .filter(cart::Column::TableNo.eq(table_no.clone()))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No cart found for table {}", table_no))
            })?;

        let items = cart.find_related(CartItem).all(&txn).await?;
        if items.is_empty() {
            return Err(ServiceError::InvalidOperation("Cart is empty".to_string()));
        }

        let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
        let addon_rows = CartItemAddon::find()
            .filter(cart_item_addon::Column::CartItemId.is_in(item_ids.clone()))
            .all(&txn)
            .await?;

        let addon_names: HashMap<i32, String> = {
            let ids: Vec<i32> = addon_rows.iter().map(|a| a.addon_option_id).collect();
            if ids.is_empty() {
                HashMap::new()
            } else {
                AddonOption::find()
                    .filter(crate::entities::addon_option::Column::Id.is_in(ids))
                    .all(&txn)
                    .await?
                    .into_iter()
                    .map(|a| (a.id, a.name))
                    .collect()
            }
        };

        let meat_names: HashMap<i32, String> = {
            let ids: Vec<i32> = items.iter().filter_map(|i| i.meat_option_id).collect();
            if ids.is_empty() {
                HashMap::new()
            } else {
                MeatOption::find()
                    .filter(crate::entities::meat_option::Column::Id.is_in(ids))
                    .all(&txn)
                    .await?
                    .into_iter()
                    .map(|m| (m.id, m.name))
                    .collect()
            }
        };

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let order_number = format!("ORD-{}", now.timestamp_millis());

        let order_row = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(order_number.clone()),
            table_no: Set(table_no.clone()),
            status: Set(OrderStatus::OrderPlaced),
            order_date: Set(now.date_naive()),
            order_time: Set(now.time()),
            total_price: Set(Decimal::ZERO),
            created_at: Set(now),
        };
        order_row.insert(&txn).await?;

        let mut order_total = Decimal::ZERO;
        for item in &items {
            let line_addons: Vec<&cart_item_addon::Model> = addon_rows
                .iter()
                .filter(|a| a.cart_item_id == item.id)
                .collect();

            // Recover the quoted per-unit price from the snapshot and peel
            // the addon extras off into their own rows.
            let addon_unit_sum: Decimal = line_addons.iter().map(|a| a.price).sum();
            let unit = item.total_price / Decimal::from(item.quantity);
            let price_each = (unit - addon_unit_sum).round_dp(2);

            let meat_label = match item.meat_option_id {
                Some(id) => Some(meat_names.get(&id).cloned().ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "Meat option {} missing while checking out cart item {}",
                        id, item.id
                    ))
                })?),
                None => None,
            };

            let order_item_id = Uuid::new_v4();
            let order_item_row = order_item::ActiveModel {
                id: Set(order_item_id),
                order_id: Set(order_id),
                menu_id: Set(item.menu_id),
                menu_name: Set(item.menu_name.clone()),
                meat_option: Set(meat_label),
                quantity: Set(item.quantity),
                price_each: Set(price_each),
            };
            order_item_row.insert(&txn).await?;
            order_total += price_each * Decimal::from(item.quantity);

            for addon in line_addons {
                let name = addon_names
                    .get(&addon.addon_option_id)
                    .cloned()
                    .ok_or_else(|| {
                        ServiceError::InternalError(format!(
                            "Addon option {} missing while checking out cart item {}",
                            addon.addon_option_id, item.id
                        ))
                    })?;
                let line_charge = (addon.price * Decimal::from(item.quantity)).round_dp(2);
                let addon_row = order_item_addon::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    order_item_id: Set(order_item_id),
                    addon_name: Set(name),
                    addon_price: Set(line_charge),
                };
                addon_row.insert(&txn).await?;
                order_total += line_charge;
            }
        }

        let order_total = order_total.round_dp(2);
        let mut order_update: order::ActiveModel = Default::default();
        order_update.id = Set(order_id);
        order_update.total_price = Set(order_total);
        order_update.update(&txn).await?;

        // The cart is consumed by checkout.
        CartItemAddon::delete_many()
            .filter(cart_item_addon::Column::CartItemId.is_in(item_ids))
            .exec(&txn)
            .await?;
        CartItem::delete_many()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .exec(&txn)
            .await?;
        Cart::delete_by_id(cart.id).exec(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderPlaced {
                order_id,
                table_no: table_no.clone(),
            })
            .await;

        info!(
            "Checked out table {}: order {} placed (total {})",
            table_no, order_number, order_total
        );

        Ok(CheckoutReceipt {
            order_id,
            order_number,
            total_price: order_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn price_each_excludes_addon_extras() {
        // Cart line quoted at (100 base + 20 meat + 5 + 3 addons) × 2 = 256.
        let line_total = dec!(256.00);
        let quantity = Decimal::from(2);
        let addon_unit_sum = dec!(5) + dec!(3);

        let unit = line_total / quantity;
        let price_each = (unit - addon_unit_sum).round_dp(2);
        assert_eq!(price_each, dec!(120.00));

        // Per-line addon charges keep the order total identical to the
        // quoted cart total.
        let addon_charges = (dec!(5) * quantity + dec!(3) * quantity).round_dp(2);
        assert_eq!(price_each * quantity + addon_charges, line_total);
    }
}
