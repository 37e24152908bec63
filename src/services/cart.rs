use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        cart, cart_item, cart_item_addon, AddonOption, AddonOptionModel, Cart, CartItem,
        CartItemAddon, CartItemModel, MeatOption, MenuItem, TableStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::tables::normalize_table_no,
};

/// Per-unit price quoted at add-to-cart time: menu base plus meat extra plus
/// every addon extra. This is the number that gets frozen into the line.
pub(crate) fn unit_price(
    base: Decimal,
    meat_extra: Option<Decimal>,
    addon_extras: &[Decimal],
) -> Decimal {
    base + meat_extra.unwrap_or(Decimal::ZERO) + addon_extras.iter().copied().sum::<Decimal>()
}

/// Draft-order service: one cart per occupied table, lines snapshot their
/// price the moment they are added.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    table_count: u32,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>, table_count: u32) -> Self {
        Self {
            db,
            event_sender,
            table_count,
        }
    }

    /// Adds a line to the table's cart, creating the cart on first use.
    ///
    /// The whole resolution (table occupancy, menu, meat, addons) and the
    /// insert run in one transaction; any missing reference rolls everything
    /// back.
    #[instrument(skip(self, input), fields(table_no = %input.table_no, menu_id = input.menu_id))]
    pub async fn add_item(&self, input: AddItemInput) -> Result<CartLine, ServiceError> {
        let table_no = normalize_table_no(&input.table_no, self.table_count)?;

        if input.quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let table = crate::entities::DiningTable::find_by_id(table_no.clone())
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Table {} not found", table_no)))?;
        if table.status != TableStatus::Occupied {
            return Err(ServiceError::InvalidOperation(format!(
                "Table {} has not been scanned",
                table_no
            )));
        }

        let menu = MenuItem::find_by_id(input.menu_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Menu item {} not found", input.menu_id))
            })?;

        let meat = match input.meat_option_id {
            Some(id) => Some(MeatOption::find_by_id(id).one(&txn).await?.ok_or_else(
                || ServiceError::NotFound(format!("Meat option {} not found", id)),
            )?),
            None => None,
        };

        let mut addons = Vec::with_capacity(input.addon_option_ids.len());
        for id in &input.addon_option_ids {
            let addon = AddonOption::find_by_id(*id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Addon option {} not found", id))
                })?;
            addons.push(addon);
        }

        // Upsert the per-table cart. The unique index on table_no backs the
        // one-active-cart invariant: if a concurrent first-add wins the
        // insert, adopt its cart.
        let cart = match Cart::find()
            .filter(cart::Column::TableNo.eq(table_no.clone()))
            .one(&txn)
            .await?
        {
            Some(cart) => cart,
            None => {
                let fresh = cart::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    table_no: Set(table_no.clone()),
                    created_at: Set(Utc::now()),
                };
                match fresh.insert(&txn).await {
                    Ok(cart) => cart,
                    Err(insert_err) => Cart::find()
                        .filter(cart::Column::TableNo.eq(table_no.clone()))
                        .one(&txn)
                        .await?
                        .ok_or(ServiceError::DatabaseError(insert_err))?,
                }
            }
        };

        let addon_extras: Vec<Decimal> = addons.iter().map(|a| a.extra_price).collect();
        let unit = unit_price(menu.price, meat.as_ref().map(|m| m.extra_price), &addon_extras);
        let total = (unit * Decimal::from(input.quantity)).round_dp(2);

        let item_id = Uuid::new_v4();
        let item = cart_item::ActiveModel {
            id: Set(item_id),
            cart_id: Set(cart.id),
            menu_id: Set(menu.id),
            menu_name: Set(menu.name_en.clone()),
            quantity: Set(input.quantity),
            meat_option_id: Set(meat.as_ref().map(|m| m.id)),
            total_price: Set(total),
        };
        let item = item.insert(&txn).await?;

        for addon in &addons {
            let row = cart_item_addon::ActiveModel {
                id: Set(Uuid::new_v4()),
                cart_item_id: Set(item_id),
                addon_option_id: Set(addon.id),
                price: Set(addon.extra_price),
            };
            row.insert(&txn).await?;
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                table_no: table_no.clone(),
                cart_item_id: item_id,
            })
            .await;

        info!(
            "Added {} x{} to cart for table {} (line total {})",
            item.menu_name, item.quantity, table_no, item.total_price
        );

        Ok(CartLine {
            cart_item_id: item.id,
            menu_id: item.menu_id,
            menu_name: item.menu_name,
            meat_option: meat.map(|m| m.name),
            addons: join_addon_names(&addons),
            quantity: item.quantity,
            total_price: item.total_price,
            image: menu.image_url,
        })
    }

    /// Rescales a line to a new quantity.
    ///
    /// Policy: pure quantity scaling. The snapshot unit price is recovered by
    /// dividing the stored line total by the old quantity; the catalog is not
    /// consulted, so a line keeps the price it was quoted at even if the menu
    /// has changed since.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        cart_item_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemModel, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let item = CartItem::find_by_id(cart_item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Cart item {} not found", cart_item_id))
            })?;

        let unit = item.total_price / Decimal::from(item.quantity);
        let new_total = (unit * Decimal::from(quantity)).round_dp(2);

        let mut active: cart_item::ActiveModel = item.into();
        active.quantity = Set(quantity);
        active.total_price = Set(new_total);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemUpdated { cart_item_id })
            .await;

        Ok(updated)
    }

    /// The table's cart with resolved option names and the grand total.
    pub async fn get_cart(&self, table_no: &str) -> Result<CartView, ServiceError> {
        let table_no = normalize_table_no(table_no, self.table_count)?;

        let cart = Cart::find()
            .filter(cart::Column::TableNo.eq(table_no.clone()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No cart found for table {}", table_no))
            })?;

        let items = cart.find_related(CartItem).all(&*self.db).await?;

        let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
        let addon_rows = if item_ids.is_empty() {
            Vec::new()
        } else {
            CartItemAddon::find()
                .filter(cart_item_addon::Column::CartItemId.is_in(item_ids))
                .all(&*self.db)
                .await?
        };

        let addon_option_ids: Vec<i32> = addon_rows.iter().map(|a| a.addon_option_id).collect();
        let addon_names: HashMap<i32, String> = if addon_option_ids.is_empty() {
            HashMap::new()
        } else {
            AddonOption::find()
                .filter(crate::entities::addon_option::Column::Id.is_in(addon_option_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|a| (a.id, a.name))
                .collect()
        };

        let meat_ids: Vec<i32> = items.iter().filter_map(|i| i.meat_option_id).collect();
        let meat_names: HashMap<i32, String> = if meat_ids.is_empty() {
            HashMap::new()
        } else {
            MeatOption::find()
                .filter(crate::entities::meat_option::Column::Id.is_in(meat_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|m| (m.id, m.name))
                .collect()
        };

        let menu_ids: Vec<i32> = items.iter().map(|i| i.menu_id).collect();
        let menu_images: HashMap<i32, Option<String>> = if menu_ids.is_empty() {
            HashMap::new()
        } else {
            MenuItem::find()
                .filter(crate::entities::menu_item::Column::Id.is_in(menu_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|m| (m.id, m.image_url))
                .collect()
        };

        let mut lines = Vec::with_capacity(items.len());
        let mut grand_total = Decimal::ZERO;
        for item in items {
            let names: Vec<String> = addon_rows
                .iter()
                .filter(|a| a.cart_item_id == item.id)
                .filter_map(|a| addon_names.get(&a.addon_option_id).cloned())
                .collect();
            grand_total += item.total_price;
            lines.push(CartLine {
                cart_item_id: item.id,
                menu_id: item.menu_id,
                meat_option: item.meat_option_id.and_then(|id| meat_names.get(&id).cloned()),
                addons: if names.is_empty() {
                    None
                } else {
                    Some(names.join(", "))
                },
                quantity: item.quantity,
                total_price: item.total_price,
                image: menu_images.get(&item.menu_id).cloned().flatten(),
                menu_name: item.menu_name,
            });
        }

        Ok(CartView {
            table_no,
            items: lines,
            grand_total,
        })
    }

    /// Deletes a line and its addon rows.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, cart_item_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        CartItem::find_by_id(cart_item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Cart item {} not found", cart_item_id))
            })?;

        CartItemAddon::delete_many()
            .filter(cart_item_addon::Column::CartItemId.eq(cart_item_id))
            .exec(&txn)
            .await?;
        CartItem::delete_by_id(cart_item_id).exec(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemRemoved { cart_item_id })
            .await;

        Ok(())
    }
}

fn join_addon_names(addons: &[AddonOptionModel]) -> Option<String> {
    if addons.is_empty() {
        None
    } else {
        Some(
            addons
                .iter()
                .map(|a| a.name.clone())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// Input for adding an item to a table's cart
#[derive(Debug, Deserialize)]
pub struct AddItemInput {
    pub table_no: String,
    pub menu_id: i32,
    pub meat_option_id: Option<i32>,
    pub quantity: i32,
    pub addon_option_ids: Vec<i32>,
}

/// One cart line as the client renders it
#[derive(Debug, Serialize)]
pub struct CartLine {
    pub cart_item_id: Uuid,
    pub menu_id: i32,
    pub menu_name: String,
    pub meat_option: Option<String>,
    pub addons: Option<String>,
    pub quantity: i32,
    pub total_price: Decimal,
    pub image: Option<String>,
}

/// Cart contents plus the grand total
#[derive(Debug, Serialize)]
pub struct CartView {
    pub table_no: String,
    pub items: Vec<CartLine>,
    pub grand_total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unit_price_sums_base_meat_and_addons() {
        let unit = unit_price(dec!(100), Some(dec!(20)), &[dec!(5), dec!(3)]);
        assert_eq!(unit, dec!(128));
    }

    #[test]
    fn unit_price_without_options_is_base() {
        assert_eq!(unit_price(dec!(60), None, &[]), dec!(60));
    }

    #[test]
    fn line_total_scales_unit_price() {
        let unit = unit_price(dec!(100), Some(dec!(20)), &[dec!(5), dec!(3)]);
        let total = (unit * Decimal::from(2)).round_dp(2);
        assert_eq!(total, dec!(256.00));
    }

    #[test]
    fn quantity_rescale_recovers_snapshot_unit() {
        // 128 × 2 stored; rescale to 3 must come from the snapshot unit, not
        // the catalog.
        let stored_total = dec!(256.00);
        let old_quantity = 2;
        let unit = stored_total / Decimal::from(old_quantity);
        assert_eq!(unit, dec!(128.00));
        assert_eq!((unit * Decimal::from(3)).round_dp(2), dec!(384.00));
    }
}
