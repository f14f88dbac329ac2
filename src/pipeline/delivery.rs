use std::sync::Arc;

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::domain::PurchaseOrder;
use crate::store::{InventoryStore, PurchaseOrderStore};

use super::queue::WorkQueue;

// ============================================================================
// Delivery Intake
// ============================================================================
//
// The receiving dock: applies a delivery against its purchase order, puts
// the goods on the shelf, and feeds the order back to the queue while it is
// still in an actionable state (full delivery lands it in `Delivered`,
// which never re-enters the pipeline).
//
// ============================================================================

pub struct DeliveryIntake {
    store: Arc<dyn PurchaseOrderStore>,
    inventory: Arc<dyn InventoryStore>,
    queue: Arc<WorkQueue>,
}

impl DeliveryIntake {
    pub fn new(
        store: Arc<dyn PurchaseOrderStore>,
        inventory: Arc<dyn InventoryStore>,
        queue: Arc<WorkQueue>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            inventory,
            queue,
        })
    }

    pub async fn record_delivery(&self, order_id: Uuid, quantity: i64) -> Result<PurchaseOrder> {
        let order = self
            .store
            .record_delivery(order_id, quantity)
            .await
            .context("recording delivery")?;

        self.inventory
            .receive(order.kind.resource(), quantity)
            .await
            .with_context(|| format!("stocking {} delivery", order.kind.resource().name()))?;

        if order.status.is_actionable() {
            self.queue.enqueue(order.id).await;
        }

        tracing::info!(
            order_id = %order.id,
            reference = %order.reference,
            delivered = quantity,
            total_delivered = order.quantity_delivered,
            ordered = order.quantity,
            status = %order.status,
            "Delivery recorded"
        );
        Ok(order)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
