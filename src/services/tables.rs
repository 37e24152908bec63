use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    entities::{
        cart, cart_item, cart_item_addon, dining_table, order, order_item, order_item_addon, Cart,
        CartItem, CartItemAddon, DiningTable, DiningTableModel, Order, OrderItem, OrderItemAddon,
        OrderStatus, TableStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Normalizes a client-supplied table number against the configured table
/// count. Accepts "1" or "01" and always yields the zero-padded form the
/// database keys on.
pub fn normalize_table_no(raw: &str, table_count: u32) -> Result<String, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.len() > 2
        || !trimmed.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ServiceError::ValidationError(format!(
            "Invalid table number: {}",
            raw
        )));
    }
    let n: u32 = trimmed
        .parse()
        .map_err(|_| ServiceError::ValidationError(format!("Invalid table number: {}", raw)))?;
    if n == 0 || n > table_count {
        return Err(ServiceError::NotFound(format!("Table {} not found", raw)));
    }
    Ok(format!("{:02}", n))
}

/// Table row plus the outstanding (not yet completed) order total, as shown
/// on the kitchen table board.
#[derive(Debug, Serialize)]
pub struct TableOverview {
    pub table_no: String,
    pub status: &'static str,
    pub total_price: Decimal,
}

/// Table occupancy lifecycle: scan-to-claim, board overview, and the two
/// close-out operations (complete keeps history, clear destroys it).
#[derive(Clone)]
pub struct TableService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    table_count: u32,
}

impl TableService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>, table_count: u32) -> Self {
        Self {
            db,
            event_sender,
            table_count,
        }
    }

    /// Inserts any table rows missing from the registry ("01" up to the
    /// configured count). Idempotent; runs at startup.
    pub async fn sync_registry(&self) -> Result<u64, ServiceError> {
        let existing: Vec<String> = DiningTable::find()
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|t| t.table_no)
            .collect();

        let mut created = 0;
        for n in 1..=self.table_count {
            let table_no = format!("{:02}", n);
            if existing.contains(&table_no) {
                continue;
            }
            let table = dining_table::ActiveModel {
                table_no: Set(table_no),
                status: Set(TableStatus::Available),
                scanned_at: Set(None),
            };
            table.insert(&*self.db).await?;
            created += 1;
        }
        if created > 0 {
            info!("Registered {} new tables", created);
        }
        Ok(created)
    }

    /// Claims a table for a dining session.
    ///
    /// The Available→Occupied flip is a single conditional UPDATE, so two
    /// concurrent scans of the same table cannot both succeed; the loser
    /// observes zero affected rows and reports the conflict.
    #[instrument(skip(self))]
    pub async fn scan_table(&self, table_no: &str) -> Result<DiningTableModel, ServiceError> {
        let table_no = normalize_table_no(table_no, self.table_count)?;

        let result = DiningTable::update_many()
            .col_expr(
                dining_table::Column::Status,
                Expr::value(TableStatus::Occupied),
            )
            .col_expr(dining_table::Column::ScannedAt, Expr::value(Some(Utc::now())))
            .filter(dining_table::Column::TableNo.eq(table_no.clone()))
            .filter(dining_table::Column::Status.eq(TableStatus::Available))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            // Nothing flipped: either the table is unknown or someone beat
            // us to it. A fresh read tells the two apart.
            DiningTable::find_by_id(table_no.clone())
                .one(&*self.db)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Table {} not found", table_no)))?;
            return Err(ServiceError::Conflict(format!(
                "Table {} is already occupied",
                table_no
            )));
        }

        let table = DiningTable::find_by_id(table_no.clone())
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Table {} not found", table_no)))?;

        self.event_sender
            .send_or_log(Event::TableScanned {
                table_no: table_no.clone(),
            })
            .await;

        info!("Table {} scanned and occupied", table_no);
        Ok(table)
    }

    /// All tables with their occupancy status and the outstanding total over
    /// orders that have not reached Complete. Read-only.
    pub async fn list_tables(&self) -> Result<Vec<TableOverview>, ServiceError> {
        let tables = DiningTable::find()
            .order_by_asc(dining_table::Column::TableNo)
            .all(&*self.db)
            .await?;

        let open_orders = Order::find()
            .filter(order::Column::Status.ne(OrderStatus::Complete))
            .all(&*self.db)
            .await?;

        let mut outstanding: HashMap<String, Decimal> = HashMap::new();
        for o in open_orders {
            *outstanding.entry(o.table_no).or_insert(Decimal::ZERO) += o.total_price;
        }

        Ok(tables
            .into_iter()
            .map(|t| TableOverview {
                status: t.status.label(),
                total_price: outstanding
                    .get(&t.table_no)
                    .copied()
                    .unwrap_or(Decimal::ZERO),
                table_no: t.table_no,
            })
            .collect())
    }

    /// Destructive close-out after payment: deletes every order (with items
    /// and addons) and the cart (with items and addons) for the table, then
    /// frees it. Idempotent; clearing an already-clear table succeeds.
    #[instrument(skip(self))]
    pub async fn clear_table(&self, table_no: &str) -> Result<(), ServiceError> {
        let table_no = normalize_table_no(table_no, self.table_count)?;
        let txn = self.db.begin().await?;

        DiningTable::find_by_id(table_no.clone())
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Table {} not found", table_no)))?;

        // Orders and their children
        let order_ids: Vec<uuid::Uuid> = Order::find()
            .filter(order::Column::TableNo.eq(table_no.clone()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|o| o.id)
            .collect();
        if !order_ids.is_empty() {
            let item_ids: Vec<uuid::Uuid> = OrderItem::find()
                .filter(order_item::Column::OrderId.is_in(order_ids.clone()))
                .all(&txn)
                .await?
                .into_iter()
                .map(|i| i.id)
                .collect();
            if !item_ids.is_empty() {
                OrderItemAddon::delete_many()
                    .filter(order_item_addon::Column::OrderItemId.is_in(item_ids.clone()))
                    .exec(&txn)
                    .await?;
                OrderItem::delete_many()
                    .filter(order_item::Column::Id.is_in(item_ids))
                    .exec(&txn)
                    .await?;
            }
            Order::delete_many()
                .filter(order::Column::Id.is_in(order_ids))
                .exec(&txn)
                .await?;
        }

        // Cart and its children
        if let Some(cart) = Cart::find()
            .filter(cart::Column::TableNo.eq(table_no.clone()))
            .one(&txn)
            .await?
        {
            let item_ids: Vec<uuid::Uuid> = CartItem::find()
                .filter(cart_item::Column::CartId.eq(cart.id))
                .all(&txn)
                .await?
                .into_iter()
                .map(|i| i.id)
                .collect();
            if !item_ids.is_empty() {
                CartItemAddon::delete_many()
                    .filter(cart_item_addon::Column::CartItemId.is_in(item_ids.clone()))
                    .exec(&txn)
                    .await?;
                CartItem::delete_many()
                    .filter(cart_item::Column::Id.is_in(item_ids))
                    .exec(&txn)
                    .await?;
            }
            Cart::delete_by_id(cart.id).exec(&txn).await?;
        }

        DiningTable::update_many()
            .col_expr(
                dining_table::Column::Status,
                Expr::value(TableStatus::Available),
            )
            .col_expr(
                dining_table::Column::ScannedAt,
                Expr::value(None::<chrono::DateTime<Utc>>),
            )
            .filter(dining_table::Column::TableNo.eq(table_no.clone()))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::TableCleared {
                table_no: table_no.clone(),
            })
            .await;

        info!("Table {} cleared", table_no);
        Ok(())
    }

    /// Payment close-out that keeps the audit trail: every order that has
    /// not reached Complete is bulk-set to Complete (deliberately skipping
    /// intermediate kitchen states) and the table is freed.
    #[instrument(skip(self))]
    pub async fn complete_table(&self, table_no: &str) -> Result<u64, ServiceError> {
        let table_no = normalize_table_no(table_no, self.table_count)?;
        let txn = self.db.begin().await?;

        DiningTable::find_by_id(table_no.clone())
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Table {} not found", table_no)))?;

        let result = Order::update_many()
            .col_expr(order::Column::Status, Expr::value(OrderStatus::Complete))
            .filter(order::Column::TableNo.eq(table_no.clone()))
            .filter(order::Column::Status.ne(OrderStatus::Complete))
            .exec(&txn)
            .await?;

        DiningTable::update_many()
            .col_expr(
                dining_table::Column::Status,
                Expr::value(TableStatus::Available),
            )
            .col_expr(
                dining_table::Column::ScannedAt,
                Expr::value(None::<chrono::DateTime<Utc>>),
            )
            .filter(dining_table::Column::TableNo.eq(table_no.clone()))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::TableCompleted {
                table_no: table_no.clone(),
                orders_completed: result.rows_affected,
            })
            .await;

        info!(
            "Table {} completed ({} orders marked Complete)",
            table_no, result.rows_affected
        );
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_pads_single_digits() {
        assert_eq!(normalize_table_no("1", 10).unwrap(), "01");
        assert_eq!(normalize_table_no("09", 10).unwrap(), "09");
        assert_eq!(normalize_table_no(" 5 ", 10).unwrap(), "05");
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert!(matches!(
            normalize_table_no("", 10),
            Err(ServiceError::ValidationError(_))
        ));
        assert!(matches!(
            normalize_table_no("1a", 10),
            Err(ServiceError::ValidationError(_))
        ));
        assert!(matches!(
            normalize_table_no("123", 10),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn normalize_rejects_out_of_range_as_not_found() {
        assert!(matches!(
            normalize_table_no("0", 10),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            normalize_table_no("11", 10),
            Err(ServiceError::NotFound(_))
        ));
    }
}
