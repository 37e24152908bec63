use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::OrderStatus;

/// Cloneable handle for publishing domain events from services.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging on failure instead of propagating it. Event
    /// delivery must never fail the request that produced it.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping event: {}", e);
        }
    }
}

// The events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Table lifecycle events
    TableScanned { table_no: String },
    TableCleared { table_no: String },
    TableCompleted { table_no: String, orders_completed: u64 },

    // Cart events
    CartItemAdded { table_no: String, cart_item_id: Uuid },
    CartItemUpdated { cart_item_id: Uuid },
    CartItemRemoved { cart_item_id: Uuid },

    // Order events
    OrderPlaced { order_id: Uuid, table_no: String },
    OrderStatusChanged {
        order_id: Uuid,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },

    // Catalog events
    MenuItemCreated { menu_id: i32 },
}

/// Drains the event channel and logs each event. A real deployment could
/// fan these out to printers or notification hooks; the channel keeps the
/// request path decoupled either way.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderPlaced { order_id, table_no } => {
                info!(%order_id, %table_no, "order placed");
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(
                    %order_id,
                    old_status = old_status.label(),
                    new_status = new_status.label(),
                    "order status changed"
                );
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    info!("Event channel closed; stopping event processing loop");
}
