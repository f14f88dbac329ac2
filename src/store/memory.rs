use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{EquipmentParameters, OrderError, OrderStatus, PurchaseOrder, Resource};

use super::{InventoryStore, PurchaseOrderStore};

// ============================================================================
// In-Memory Stores
// ============================================================================
//
// The simulation's record store. Every operation takes the single map lock,
// so a multi-field update commits whole or not at all.
//
// ============================================================================

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<HashMap<Uuid, PurchaseOrder>>,
    equipment_parameters: Mutex<Option<EquipmentParameters>>,
}

impl MemoryOrderStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_equipment_parameters(params: EquipmentParameters) -> Arc<Self> {
        Arc::new(Self {
            orders: Mutex::new(HashMap::new()),
            equipment_parameters: Mutex::new(Some(params)),
        })
    }

    pub async fn set_equipment_parameters(&self, params: Option<EquipmentParameters>) {
        *self.equipment_parameters.lock().await = params;
    }
}

#[async_trait]
impl PurchaseOrderStore for MemoryOrderStore {
    async fn insert(&self, order: PurchaseOrder) -> Result<Uuid> {
        let id = order.id;
        let mut orders = self.orders.lock().await;
        if orders.contains_key(&id) {
            bail!("duplicate purchase order id: {}", id);
        }
        orders.insert(id, order);
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PurchaseOrder>> {
        Ok(self.orders.lock().await.get(&id).cloned())
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<bool> {
        let mut orders = self.orders.lock().await;
        match orders.get_mut(&id) {
            Some(order) => {
                order.status = status;
                order.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_shipment_fields(&self, id: Uuid, shipment_id: &str) -> Result<bool> {
        let mut orders = self.orders.lock().await;
        match orders.get_mut(&id) {
            Some(order) => {
                order.shipment_id = Some(shipment_id.to_string());
                order.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_shipping_details(
        &self,
        id: Uuid,
        bank_account: &str,
        price_cents: i64,
    ) -> Result<bool> {
        let mut orders = self.orders.lock().await;
        match orders.get_mut(&id) {
            Some(order) => {
                order.shipper_account = Some(bank_account.to_string());
                order.shipping_price_cents = price_cents;
                order.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn record_delivery(&self, id: Uuid, quantity: i64) -> Result<PurchaseOrder> {
        let mut orders = self.orders.lock().await;
        let order = orders.get_mut(&id).ok_or(OrderError::NotFound(id))?;
        order.record_delivery(quantity)?;
        Ok(order.clone())
    }

    async fn list_active(&self) -> Result<Vec<PurchaseOrder>> {
        let orders = self.orders.lock().await;
        let mut active: Vec<PurchaseOrder> = orders
            .values()
            .filter(|o| !o.status.is_terminal())
            .cloned()
            .collect();
        // Stable ordering so queue population is deterministic
        active.sort_by_key(|o| o.created_at);
        Ok(active)
    }

    async fn get_equipment_parameters(&self) -> Result<Option<EquipmentParameters>> {
        Ok(*self.equipment_parameters.lock().await)
    }
}

// ============================================================================
// Inventory
// ============================================================================

pub struct MemoryInventoryStore {
    levels: Mutex<HashMap<Resource, i64>>,
}

impl MemoryInventoryStore {
    pub fn new(initial: impl IntoIterator<Item = (Resource, i64)>) -> Arc<Self> {
        Arc::new(Self {
            levels: Mutex::new(initial.into_iter().collect()),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::new([])
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn current_quantity(&self, resource: Resource) -> Result<i64> {
        Ok(*self.levels.lock().await.get(&resource).unwrap_or(&0))
    }

    async fn consume(&self, resource: Resource, quantity: i64) -> Result<i64> {
        if quantity <= 0 {
            bail!("consumption quantity must be positive, got {}", quantity);
        }
        let mut levels = self.levels.lock().await;
        let level = levels.entry(resource).or_insert(0);
        if *level < quantity {
            bail!(
                "insufficient {} stock: have {}, need {}",
                resource.name(),
                *level,
                quantity
            );
        }
        *level -= quantity;
        Ok(*level)
    }

    async fn receive(&self, resource: Resource, quantity: i64) -> Result<i64> {
        if quantity <= 0 {
            bail!("received quantity must be positive, got {}", quantity);
        }
        let mut levels = self.levels.lock().await;
        let level = levels.entry(resource).or_insert(0);
        *level += quantity;
        Ok(*level)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
