use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{EquipmentParameters, OrderStatus, PurchaseOrder, Resource};

// ============================================================================
// Record Store Seams
// ============================================================================
//
// Persistence is an external collaborator: the pipeline only needs the CRUD
// surface below. The bundled implementation (`memory`) keeps everything in
// process, which is all the simulation needs; a database-backed store slots
// in behind the same traits.
//
// ============================================================================

// Private module declaration
mod memory;

pub use memory::{MemoryInventoryStore, MemoryOrderStore};

/// CRUD surface for purchase orders.
#[async_trait]
pub trait PurchaseOrderStore: Send + Sync {
    /// Persist a freshly-created order. Returns its identifier.
    async fn insert(&self, order: PurchaseOrder) -> Result<Uuid>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PurchaseOrder>>;

    /// Move an order to a new lifecycle state. Returns false when the order
    /// no longer exists.
    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<bool>;

    /// Attach the logistics-side shipment identifier.
    async fn update_shipment_fields(&self, id: Uuid, shipment_id: &str) -> Result<bool>;

    /// Persist the shipper's bank account and the computed shipping price.
    async fn update_shipping_details(
        &self,
        id: Uuid,
        bank_account: &str,
        price_cents: i64,
    ) -> Result<bool>;

    /// Apply a delivery to the order, returning the updated record.
    /// Domain violations surface as `OrderError` inside the error chain.
    async fn record_delivery(&self, id: Uuid, quantity: i64) -> Result<PurchaseOrder>;

    /// Every order in a non-terminal status.
    async fn list_active(&self) -> Result<Vec<PurchaseOrder>>;

    /// Shipment weight data for equipment orders. `None` means the plant
    /// configuration is incomplete and equipment cannot be shipped.
    async fn get_equipment_parameters(&self) -> Result<Option<EquipmentParameters>>;
}

/// Stock levels for the reorder monitor and the intake/production paths.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn current_quantity(&self, resource: Resource) -> Result<i64>;

    /// Draw down stock, e.g. when production consumes material.
    /// Returns the new level.
    async fn consume(&self, resource: Resource, quantity: i64) -> Result<i64>;

    /// Add delivered stock. Returns the new level.
    async fn receive(&self, resource: Resource, quantity: i64) -> Result<i64>;
}
