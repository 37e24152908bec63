use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        menu_item, order, order_item, order_item_addon, MenuItem, Order, OrderItem,
        OrderItemAddon, OrderItemAddonModel, OrderItemModel, OrderModel, OrderStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::tables::normalize_table_no,
};

/// Rejects backward moves through the kitchen workflow. Same-status updates
/// are a no-op; `complete_table` is the one caller allowed to jump states,
/// and it goes through its own bulk update.
fn ensure_forward_transition(
    current: OrderStatus,
    next: OrderStatus,
) -> Result<(), ServiceError> {
    if next < current {
        return Err(ServiceError::InvalidOperation(format!(
            "Cannot move order from '{}' back to '{}'",
            current.label(),
            next.label()
        )));
    }
    Ok(())
}

/// Order reads and the kitchen status workflow.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    table_count: u32,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>, table_count: u32) -> Self {
        Self {
            db,
            event_sender,
            table_count,
        }
    }

    /// Every order in the system, newest first.
    pub async fn list_orders(&self) -> Result<Vec<OrderView>, ServiceError> {
        let orders = Order::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        self.assemble_views(orders).await
    }

    pub async fn get_order(&self, id: Uuid) -> Result<OrderView, ServiceError> {
        let order = Order::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;
        let mut views = self.assemble_views(vec![order]).await?;
        Ok(views.remove(0))
    }

    /// Orders for a table, oldest first; `order_number` narrows the result
    /// to a single order (the customer order-details screen).
    pub async fn orders_for_table(
        &self,
        table_no: &str,
        order_number: Option<&str>,
    ) -> Result<Vec<OrderView>, ServiceError> {
        let table_no = normalize_table_no(table_no, self.table_count)?;
        let mut query = Order::find()
            .filter(order::Column::TableNo.eq(table_no.clone()))
            .order_by_asc(order::Column::CreatedAt);
        if let Some(number) = order_number.filter(|n| !n.trim().is_empty()) {
            query = query.filter(order::Column::OrderNumber.eq(number.trim().to_string()));
        }
        let orders = query.all(&*self.db).await?;

        if order_number.is_some() && orders.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "Order not found for table {}",
                table_no
            )));
        }

        self.assemble_views(orders).await
    }

    /// The status-tracker payload for a table.
    pub async fn order_status_for_table(
        &self,
        table_no: &str,
    ) -> Result<Vec<OrderStatusEntry>, ServiceError> {
        let table_no = normalize_table_no(table_no, self.table_count)?;
        let orders = Order::find()
            .filter(order::Column::TableNo.eq(table_no))
            .order_by_asc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let items = if order_ids.is_empty() {
            Vec::new()
        } else {
            OrderItem::find()
                .filter(order_item::Column::OrderId.is_in(order_ids))
                .all(&*self.db)
                .await?
        };

        let mut item_counts: HashMap<Uuid, i32> = HashMap::new();
        for item in &items {
            *item_counts.entry(item.order_id).or_insert(0) += item.quantity;
        }

        Ok(orders
            .into_iter()
            .map(|o| OrderStatusEntry {
                id: o.id,
                total_items: item_counts.get(&o.id).copied().unwrap_or(0),
                order_number: o.order_number,
                status: o.status.label(),
                total_price: o.total_price,
                order_date: o.order_date,
                order_time: o.order_time,
            })
            .collect())
    }

    /// Kitchen table-detail view: orders with the legacy compact item shape.
    pub async fn kitchen_orders_for_table(
        &self,
        table_no: &str,
    ) -> Result<Vec<KitchenOrder>, ServiceError> {
        let table_no = normalize_table_no(table_no, self.table_count)?;
        let orders = Order::find()
            .filter(order::Column::TableNo.eq(table_no))
            .order_by_asc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let (items, addons, menu_images) = self.load_children(&orders).await?;

        Ok(orders
            .into_iter()
            .map(|o| {
                let order_items = items
                    .iter()
                    .filter(|i| i.order_id == o.id)
                    .map(|i| KitchenOrderItem {
                        menu_image: menu_images.get(&i.menu_id).cloned().flatten(),
                        menu_name: i.menu_name.clone(),
                        meat: i.meat_option.clone(),
                        add_on: joined_addon_names(&addons, i.id),
                        quantity: i.quantity,
                        price: line_total(i, &addons),
                    })
                    .collect();
                KitchenOrder {
                    id: o.id,
                    order_number: o.order_number,
                    status: o.status.label(),
                    items: order_items,
                }
            })
            .collect())
    }

    /// Prices out every order on a table, oldest first.
    pub async fn bills_for_table(
        &self,
        table_no: &str,
    ) -> Result<(String, Vec<crate::services::billing::OrderBill>), ServiceError> {
        let table_no = normalize_table_no(table_no, self.table_count)?;
        let orders = Order::find()
            .filter(order::Column::TableNo.eq(table_no.clone()))
            .order_by_asc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let (items, addons, _) = self.load_children(&orders).await?;
        let bills = orders
            .iter()
            .map(|o| crate::services::billing::bill_for_order(o, &items, &addons))
            .collect();
        Ok((table_no, bills))
    }

    /// Applies a kitchen status update with the forward-only guard.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderModel, ServiceError> {
        let txn = self.db.begin().await?;

        let order = Order::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let old_status = order.status;
        ensure_forward_transition(old_status, new_status)?;

        if old_status == new_status {
            return Ok(order);
        }

        let mut active: order::ActiveModel = order.into();
        active.status = Set(new_status);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            })
            .await;

        info!(
            "Order {} status updated from '{}' to '{}'",
            order_id,
            old_status.label(),
            new_status.label()
        );

        Ok(updated)
    }

    async fn load_children(
        &self,
        orders: &[OrderModel],
    ) -> Result<
        (
            Vec<OrderItemModel>,
            Vec<OrderItemAddonModel>,
            HashMap<i32, Option<String>>,
        ),
        ServiceError,
    > {
        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        if order_ids.is_empty() {
            return Ok((Vec::new(), Vec::new(), HashMap::new()));
        }

        let items = OrderItem::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .all(&*self.db)
            .await?;

        let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
        let addons = if item_ids.is_empty() {
            Vec::new()
        } else {
            OrderItemAddon::find()
                .filter(order_item_addon::Column::OrderItemId.is_in(item_ids))
                .all(&*self.db)
                .await?
        };

        let menu_ids: Vec<i32> = items.iter().map(|i| i.menu_id).collect();
        let menu_images: HashMap<i32, Option<String>> = if menu_ids.is_empty() {
            HashMap::new()
        } else {
            MenuItem::find()
                .filter(menu_item::Column::Id.is_in(menu_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|m| (m.id, m.image_url))
                .collect()
        };

        Ok((items, addons, menu_images))
    }

    async fn assemble_views(
        &self,
        orders: Vec<OrderModel>,
    ) -> Result<Vec<OrderView>, ServiceError> {
        let (items, addons, menu_images) = self.load_children(&orders).await?;

        Ok(orders
            .into_iter()
            .map(|o| {
                let order_items = items
                    .iter()
                    .filter(|i| i.order_id == o.id)
                    .map(|i| OrderItemView {
                        menu_name: i.menu_name.clone(),
                        meat_option: i.meat_option.clone(),
                        addons: joined_addon_names(&addons, i.id),
                        quantity: i.quantity,
                        total_price: line_total(i, &addons),
                        image: menu_images.get(&i.menu_id).cloned().flatten(),
                    })
                    .collect();
                OrderView {
                    id: o.id,
                    order_number: o.order_number,
                    table_no: o.table_no,
                    status: o.status.label(),
                    order_date: o.order_date,
                    order_time: o.order_time,
                    grand_total: o.total_price,
                    items: order_items,
                }
            })
            .collect())
    }
}

fn joined_addon_names(addons: &[OrderItemAddonModel], order_item_id: Uuid) -> Option<String> {
    let names: Vec<String> = addons
        .iter()
        .filter(|a| a.order_item_id == order_item_id)
        .map(|a| a.addon_name.clone())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

fn line_total(item: &OrderItemModel, addons: &[OrderItemAddonModel]) -> Decimal {
    let addon_sum: Decimal = addons
        .iter()
        .filter(|a| a.order_item_id == item.id)
        .map(|a| a.addon_price)
        .sum();
    item.price_each * Decimal::from(item.quantity) + addon_sum
}

/// Full order as the customer screens render it
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: Uuid,
    pub order_number: String,
    pub table_no: String,
    pub status: &'static str,
    pub order_date: NaiveDate,
    pub order_time: NaiveTime,
    pub grand_total: Decimal,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Serialize)]
pub struct OrderItemView {
    pub menu_name: String,
    pub meat_option: Option<String>,
    pub addons: Option<String>,
    pub quantity: i32,
    pub total_price: Decimal,
    pub image: Option<String>,
}

/// Row in the status tracker
#[derive(Debug, Serialize)]
pub struct OrderStatusEntry {
    pub id: Uuid,
    pub order_number: String,
    pub status: &'static str,
    pub total_items: i32,
    pub total_price: Decimal,
    pub order_date: NaiveDate,
    pub order_time: NaiveTime,
}

/// Kitchen table-detail order with the legacy item field names
#[derive(Debug, Serialize)]
pub struct KitchenOrder {
    pub id: Uuid,
    pub order_number: String,
    pub status: &'static str,
    pub items: Vec<KitchenOrderItem>,
}

#[derive(Debug, Serialize)]
pub struct KitchenOrderItem {
    pub menu_image: Option<String>,
    pub menu_name: String,
    pub meat: Option<String>,
    pub add_on: Option<String>,
    pub quantity: i32,
    pub price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_allowed() {
        assert!(ensure_forward_transition(OrderStatus::OrderPlaced, OrderStatus::Preparing).is_ok());
        assert!(ensure_forward_transition(OrderStatus::Preparing, OrderStatus::Served).is_ok());
        assert!(ensure_forward_transition(OrderStatus::Preparing, OrderStatus::Complete).is_ok());
        // Same status is a no-op, not an error
        assert!(ensure_forward_transition(OrderStatus::Preparing, OrderStatus::Preparing).is_ok());
    }

    #[test]
    fn backward_transitions_rejected() {
        assert!(matches!(
            ensure_forward_transition(OrderStatus::Preparing, OrderStatus::OrderPlaced),
            Err(ServiceError::InvalidOperation(_))
        ));
        assert!(matches!(
            ensure_forward_transition(OrderStatus::Complete, OrderStatus::Served),
            Err(ServiceError::InvalidOperation(_))
        ));
    }
}
