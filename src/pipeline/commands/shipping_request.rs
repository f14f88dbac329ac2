use std::sync::Arc;

use async_trait::async_trait;

use crate::collaborators::{
    LogisticsGateway, PickupItem, PickupRequest, UNIT_KILOGRAM, UNIT_PIECE,
};
use crate::domain::{OrderKind, OrderStatus, PurchaseOrder};
use crate::store::PurchaseOrderStore;

use super::{CommandOutcome, FulfillmentCommand};

// ============================================================================
// Shipping Request Command
// ============================================================================
//
// Handles `RequiresDelivery`: asks the logistics service to pick the goods
// up from the supplier, then persists the shipment linkage and the shipping
// terms before advancing to `RequiresPaymentToLogistics`.
//
// The status write goes last. Re-executing after a crash between writes
// re-requests the pickup and overwrites the same fields, which the
// logistics service either confirms idempotently or rejects explicitly.
//
// ============================================================================

pub struct ShippingRequestCommand {
    order: PurchaseOrder,
    store: Arc<dyn PurchaseOrderStore>,
    logistics: Arc<dyn LogisticsGateway>,
    origin_company: String,
    company_id: String,
}

impl ShippingRequestCommand {
    pub fn new(
        order: PurchaseOrder,
        store: Arc<dyn PurchaseOrderStore>,
        logistics: Arc<dyn LogisticsGateway>,
        origin_company: impl Into<String>,
        company_id: impl Into<String>,
    ) -> Self {
        Self {
            order,
            store,
            logistics,
            origin_company: origin_company.into(),
            company_id: company_id.into(),
        }
    }

    fn persist_failure(&self, update: anyhow::Result<bool>) -> Option<CommandOutcome> {
        match update {
            Ok(true) => None,
            Ok(false) => Some(CommandOutcome::fatal(format!(
                "order {} vanished from the store while persisting shipment",
                self.order.id
            ))),
            Err(e) => Some(CommandOutcome::retryable(format!(
                "persisting shipment details failed: {:#}",
                e
            ))),
        }
    }
}

#[async_trait]
impl FulfillmentCommand for ShippingRequestCommand {
    fn action(&self) -> &'static str {
        "shipping_request"
    }

    async fn execute(&self) -> CommandOutcome {
        // Equipment weight drives the manifest for equipment orders; its
        // absence is a plant configuration problem, not a transient fault.
        let params = match self.store.get_equipment_parameters().await {
            Ok(Some(params)) => params,
            Ok(None) => {
                return CommandOutcome::fatal("equipment parameters are not configured")
            }
            Err(e) => {
                return CommandOutcome::retryable(format!(
                    "equipment parameter lookup failed: {:#}",
                    e
                ))
            }
        };

        let item = match self.order.kind {
            OrderKind::Equipment => PickupItem {
                name: "equipment".to_string(),
                quantity: params.weight,
                unit: UNIT_PIECE.to_string(),
            },
            OrderKind::Material(material) => PickupItem {
                name: material.name().to_string(),
                quantity: self.order.quantity,
                unit: UNIT_KILOGRAM.to_string(),
            },
        };

        let request = PickupRequest {
            origin_company: self.origin_company.clone(),
            destination_company: self.company_id.clone(),
            external_order_id: self.order.reference.clone(),
            items: vec![item],
        };

        let confirmation = match self.logistics.request_pickup(request).await {
            Ok(confirmation) => confirmation,
            Err(e) => return CommandOutcome::retryable(format!("{:#}", e)),
        };

        if let Some(failure) = self.persist_failure(
            self.store
                .update_shipment_fields(self.order.id, &confirmation.shipment_id)
                .await,
        ) {
            return failure;
        }
        if let Some(failure) = self.persist_failure(
            self.store
                .update_shipping_details(
                    self.order.id,
                    &confirmation.bank_account,
                    confirmation.cost_cents,
                )
                .await,
        ) {
            return failure;
        }
        if let Some(failure) = self.persist_failure(
            self.store
                .update_status(self.order.id, OrderStatus::RequiresPaymentToLogistics)
                .await,
        ) {
            return failure;
        }

        tracing::info!(
            order_id = %self.order.id,
            reference = %self.order.reference,
            shipment_id = %confirmation.shipment_id,
            shipping_cost_cents = confirmation.cost_cents,
            "Pickup arranged, order awaiting logistics payment"
        );
        CommandOutcome::succeeded()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::PickupConfirmation;
    use crate::domain::{EquipmentParameters, Material};
    use crate::store::MemoryOrderStore;
    use anyhow::anyhow;
    use std::sync::Mutex;

    struct ScriptedLogistics {
        confirmation: Option<PickupConfirmation>,
        requests: Mutex<Vec<PickupRequest>>,
    }

    impl ScriptedLogistics {
        fn confirming(confirmation: PickupConfirmation) -> Arc<Self> {
            Arc::new(Self {
                confirmation: Some(confirmation),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                confirmation: None,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LogisticsGateway for ScriptedLogistics {
        async fn request_pickup(&self, request: PickupRequest) -> anyhow::Result<PickupConfirmation> {
            self.requests.lock().unwrap().push(request);
            self.confirmation
                .clone()
                .ok_or_else(|| anyhow!("logistics service returned 503"))
        }
    }

    fn ship_1_confirmation() -> PickupConfirmation {
        PickupConfirmation {
            shipment_id: "SHIP-1".to_string(),
            bank_account: "ACC-9".to_string(),
            cost_cents: 200,
        }
    }

    async fn awaiting_delivery(
        store: &Arc<MemoryOrderStore>,
        kind: OrderKind,
        quantity: i64,
    ) -> PurchaseOrder {
        let mut order = PurchaseOrder::new(kind, quantity, 50, "SUP-ACC-1").unwrap();
        order.status = OrderStatus::RequiresDelivery;
        store.insert(order.clone()).await.unwrap();
        order
    }

    #[tokio::test]
    async fn test_confirmed_pickup_persists_shipment_and_advances() {
        let store = MemoryOrderStore::with_equipment_parameters(EquipmentParameters { weight: 120 });
        let order =
            awaiting_delivery(&store, OrderKind::Material(Material::Sand), 100).await;
        let logistics = ScriptedLogistics::confirming(ship_1_confirmation());

        let command = ShippingRequestCommand::new(
            order.clone(),
            store.clone(),
            logistics.clone(),
            "supplier-co",
            "plant-1",
        );
        let outcome = command.execute().await;

        assert!(outcome.success);
        let stored = store.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.shipment_id.as_deref(), Some("SHIP-1"));
        assert_eq!(stored.shipper_account.as_deref(), Some("ACC-9"));
        assert_eq!(stored.shipping_price_cents, 200);
        assert_eq!(stored.status, OrderStatus::RequiresPaymentToLogistics);
    }

    #[tokio::test]
    async fn test_material_manifest_uses_order_quantity_in_kilograms() {
        let store = MemoryOrderStore::with_equipment_parameters(EquipmentParameters { weight: 120 });
        let order =
            awaiting_delivery(&store, OrderKind::Material(Material::Copper), 75).await;
        let logistics = ScriptedLogistics::confirming(ship_1_confirmation());

        ShippingRequestCommand::new(
            order.clone(),
            store,
            logistics.clone(),
            "supplier-co",
            "plant-1",
        )
        .execute()
        .await;

        let requests = logistics.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].origin_company, "supplier-co");
        assert_eq!(requests[0].destination_company, "plant-1");
        assert_eq!(requests[0].external_order_id, order.reference);
        assert_eq!(requests[0].items.len(), 1);
        assert_eq!(requests[0].items[0].name, "copper");
        assert_eq!(requests[0].items[0].quantity, 75);
        assert_eq!(requests[0].items[0].unit, UNIT_KILOGRAM);
    }

    #[tokio::test]
    async fn test_equipment_manifest_uses_equipment_weight() {
        let store = MemoryOrderStore::with_equipment_parameters(EquipmentParameters { weight: 120 });
        let order = awaiting_delivery(&store, OrderKind::Equipment, 3).await;
        let logistics = ScriptedLogistics::confirming(ship_1_confirmation());

        ShippingRequestCommand::new(order, store, logistics.clone(), "supplier-co", "plant-1")
            .execute()
            .await;

        let requests = logistics.requests.lock().unwrap();
        assert_eq!(requests[0].items[0].name, "equipment");
        assert_eq!(requests[0].items[0].quantity, 120);
        assert_eq!(requests[0].items[0].unit, UNIT_PIECE);
    }

    #[tokio::test]
    async fn test_missing_equipment_parameters_is_fatal() {
        let store = MemoryOrderStore::new();
        let order =
            awaiting_delivery(&store, OrderKind::Material(Material::Sand), 100).await;
        let logistics = ScriptedLogistics::confirming(ship_1_confirmation());

        let outcome = ShippingRequestCommand::new(
            order.clone(),
            store.clone(),
            logistics,
            "supplier-co",
            "plant-1",
        )
        .execute()
        .await;

        assert!(outcome.is_fatal());
        let stored = store.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::RequiresDelivery);
    }

    #[tokio::test]
    async fn test_logistics_failure_is_retryable_and_leaves_order_untouched() {
        let store = MemoryOrderStore::with_equipment_parameters(EquipmentParameters { weight: 120 });
        let order =
            awaiting_delivery(&store, OrderKind::Material(Material::Sand), 100).await;
        let logistics = ScriptedLogistics::failing();

        let outcome =
            ShippingRequestCommand::new(order.clone(), store.clone(), logistics, "supplier-co", "plant-1")
                .execute()
                .await;

        assert!(!outcome.success);
        assert!(outcome.should_retry);
        let stored = store.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::RequiresDelivery);
        assert!(stored.shipment_id.is_none());
    }
}
