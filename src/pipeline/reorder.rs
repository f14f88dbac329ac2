use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::ReorderConfig;
use crate::domain::{PurchaseOrder, Resource};
use crate::metrics::Metrics;
use crate::store::{InventoryStore, PurchaseOrderStore};

use super::queue::WorkQueue;

// ============================================================================
// Reorder Monitor
// ============================================================================
//
// Closes the loop between inventory state and procurement. Each run computes
// on-hand + incoming stock per resource against its configured reorder
// point; a breached point creates a purchase order (placeholder supplier
// terms pending a real supplier-selection integration) and feeds its id to
// the work queue.
//
// ============================================================================

/// Computed-on-demand stock snapshot for one resource. Never persisted.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InventoryStatus {
    pub resource: Resource,
    pub current: i64,
    /// Undelivered remainder across active purchase orders of this kind.
    pub incoming: i64,
    pub target: i64,
    pub reorder_point: i64,
    pub needs_reorder: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReorderReport {
    pub enabled: bool,
    pub statuses: Vec<InventoryStatus>,
    pub created_order_ids: Vec<Uuid>,
    pub checked_at: DateTime<Utc>,
}

impl ReorderReport {
    fn disabled() -> Self {
        Self {
            enabled: false,
            statuses: Vec::new(),
            created_order_ids: Vec::new(),
            checked_at: Utc::now(),
        }
    }
}

pub struct ReorderMonitor {
    store: Arc<dyn PurchaseOrderStore>,
    inventory: Arc<dyn InventoryStore>,
    queue: Arc<WorkQueue>,
    config: ReorderConfig,
    metrics: Arc<Metrics>,
}

impl ReorderMonitor {
    pub fn new(
        store: Arc<dyn PurchaseOrderStore>,
        inventory: Arc<dyn InventoryStore>,
        queue: Arc<WorkQueue>,
        config: ReorderConfig,
        metrics: Arc<Metrics>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            inventory,
            queue,
            config,
            metrics,
        })
    }

    pub async fn run(&self) -> Result<ReorderReport> {
        if !self.config.auto_reorder {
            tracing::info!("Auto-reorder disabled by configuration");
            return Ok(ReorderReport::disabled());
        }

        let active = self
            .store
            .list_active()
            .await
            .context("loading active purchase orders")?;

        let mut statuses = Vec::with_capacity(Resource::ALL.len());
        let mut created_order_ids = Vec::new();

        for resource in Resource::ALL {
            let current = self
                .inventory
                .current_quantity(resource)
                .await
                .with_context(|| format!("reading {} stock", resource.name()))?;
            let incoming: i64 = active
                .iter()
                .filter(|order| order.kind.resource() == resource)
                .map(|order| order.outstanding())
                .sum();

            let policy = self.config.policy(resource);
            let needs_reorder = current + incoming <= policy.reorder_point;

            statuses.push(InventoryStatus {
                resource,
                current,
                incoming,
                target: policy.target,
                reorder_point: policy.reorder_point,
                needs_reorder,
            });

            if !needs_reorder {
                continue;
            }

            let order = PurchaseOrder::new(
                resource.order_kind(),
                policy.order_quantity,
                self.config.placeholder_unit_price_cents,
                &self.config.placeholder_seller_account,
            )?;
            let id = self
                .store
                .insert(order)
                .await
                .with_context(|| format!("creating {} reorder", resource.name()))?;
            self.queue.enqueue(id).await;
            self.metrics.record_reorder(resource.name());

            tracing::info!(
                resource = resource.name(),
                order_id = %id,
                quantity = policy.order_quantity,
                on_hand = current,
                incoming = incoming,
                reorder_point = policy.reorder_point,
                "📦 Reorder point breached, purchase order created and queued"
            );
            created_order_ids.push(id);
        }

        Ok(ReorderReport {
            enabled: true,
            statuses,
            created_order_ids,
            checked_at: Utc::now(),
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
