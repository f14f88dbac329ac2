use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;
use super::value_objects::{OrderKind, OrderStatus};

// ============================================================================
// Purchase Order Record
// ============================================================================
//
// One procurement transaction moving from creation to completed delivery.
// The record is mutated only by the pipeline commands (status + shipment
// fields) and the delivery-intake path (quantity_delivered). Orders are
// never deleted; terminal states stay in the store for audit.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    // Identity
    pub id: Uuid,
    /// Externally-visible order reference, quoted to collaborators.
    pub reference: String,

    // Classification
    pub kind: OrderKind,

    // Quantities; 0 <= quantity_delivered <= quantity always holds
    pub quantity: i64,
    pub quantity_delivered: i64,

    // Commercial terms
    pub unit_price_cents: i64,
    pub seller_account: String,
    pub shipper_account: Option<String>,
    pub shipping_price_cents: i64,

    // Shipment linkage, set once a pickup request succeeds
    pub shipment_id: Option<String>,

    pub status: OrderStatus,

    // Audit trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseOrder {
    /// Create a new order awaiting supplier payment.
    pub fn new(
        kind: OrderKind,
        quantity: i64,
        unit_price_cents: i64,
        seller_account: impl Into<String>,
    ) -> Result<Self, OrderError> {
        if quantity <= 0 {
            return Err(OrderError::InvalidQuantity(quantity));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        Ok(Self {
            id,
            reference: format!("PO-{}", &id.simple().to_string()[..8]),
            kind,
            quantity,
            quantity_delivered: 0,
            unit_price_cents,
            seller_account: seller_account.into(),
            shipper_account: None,
            shipping_price_cents: 0,
            shipment_id: None,
            status: OrderStatus::RequiresPaymentToSupplier,
            created_at: now,
            updated_at: now,
        })
    }

    /// Amount owed to the supplier for the full order.
    pub fn total_price_cents(&self) -> i64 {
        self.quantity * self.unit_price_cents
    }

    /// Quantity still expected from the supplier.
    pub fn outstanding(&self) -> i64 {
        self.quantity - self.quantity_delivered
    }

    /// Record a partial or final delivery against this order.
    ///
    /// Keeps `quantity_delivered <= quantity`; reaching equality transitions
    /// the order to `Delivered`.
    pub fn record_delivery(&mut self, quantity: i64) -> Result<(), OrderError> {
        if quantity <= 0 {
            return Err(OrderError::InvalidDeliveryQuantity(quantity));
        }
        if self.status != OrderStatus::WaitingForDelivery {
            return Err(OrderError::NotAwaitingDelivery(self.status));
        }
        let outstanding = self.outstanding();
        if quantity > outstanding {
            return Err(OrderError::DeliveryExceedsOrdered {
                attempted: quantity,
                outstanding,
            });
        }

        self.quantity_delivered += quantity;
        if self.quantity_delivered == self.quantity {
            self.status = OrderStatus::Delivered;
        }
        self.updated_at = Utc::now();

        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Material;

    fn waiting_order(quantity: i64) -> PurchaseOrder {
        let mut order =
            PurchaseOrder::new(OrderKind::Material(Material::Sand), quantity, 50, "SUP-ACC-1")
                .unwrap();
        order.status = OrderStatus::WaitingForDelivery;
        order
    }

    #[test]
    fn test_new_order_starts_awaiting_supplier_payment() {
        let order =
            PurchaseOrder::new(OrderKind::Equipment, 3, 10_000, "SUP-ACC-1").unwrap();

        assert_eq!(order.status, OrderStatus::RequiresPaymentToSupplier);
        assert_eq!(order.quantity_delivered, 0);
        assert_eq!(order.shipping_price_cents, 0);
        assert!(order.shipment_id.is_none());
        assert!(order.shipper_account.is_none());
        assert!(order.reference.starts_with("PO-"));
    }

    #[test]
    fn test_new_order_rejects_nonpositive_quantity() {
        let result = PurchaseOrder::new(OrderKind::Equipment, 0, 10_000, "SUP-ACC-1");
        assert!(matches!(result, Err(OrderError::InvalidQuantity(0))));
    }

    #[test]
    fn test_total_price() {
        let order =
            PurchaseOrder::new(OrderKind::Material(Material::Sand), 100, 50, "SUP-ACC-1")
                .unwrap();
        assert_eq!(order.total_price_cents(), 5_000);
    }

    #[test]
    fn test_partial_delivery_keeps_waiting() {
        let mut order = waiting_order(100);

        order.record_delivery(40).unwrap();

        assert_eq!(order.quantity_delivered, 40);
        assert_eq!(order.status, OrderStatus::WaitingForDelivery);
        assert_eq!(order.outstanding(), 60);
    }

    #[test]
    fn test_final_delivery_transitions_to_delivered() {
        let mut order = waiting_order(100);

        order.record_delivery(60).unwrap();
        order.record_delivery(40).unwrap();

        assert_eq!(order.quantity_delivered, 100);
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[test]
    fn test_delivery_cannot_exceed_ordered_quantity() {
        let mut order = waiting_order(100);
        order.record_delivery(90).unwrap();

        let result = order.record_delivery(20);

        assert!(matches!(
            result,
            Err(OrderError::DeliveryExceedsOrdered {
                attempted: 20,
                outstanding: 10
            })
        ));
        // Failed intake leaves the record untouched
        assert_eq!(order.quantity_delivered, 90);
        assert_eq!(order.status, OrderStatus::WaitingForDelivery);
    }

    #[test]
    fn test_delivery_rejected_outside_waiting_status() {
        let mut order =
            PurchaseOrder::new(OrderKind::Material(Material::Copper), 10, 5, "SUP-ACC-1")
                .unwrap();

        let result = order.record_delivery(5);

        assert!(matches!(
            result,
            Err(OrderError::NotAwaitingDelivery(
                OrderStatus::RequiresPaymentToSupplier
            ))
        ));
    }
}
