use std::sync::Arc;

use async_trait::async_trait;

use crate::collaborators::PaymentGateway;
use crate::domain::{OrderStatus, PurchaseOrder};
use crate::store::PurchaseOrderStore;

use super::{CommandOutcome, FulfillmentCommand};

// ============================================================================
// Logistics Payment Command
// ============================================================================
//
// Handles `RequiresPaymentToLogistics`: pays the shipper the computed
// shipping price and advances the order to `WaitingForDelivery`.
//
// ============================================================================

pub struct LogisticsPaymentCommand {
    order: PurchaseOrder,
    store: Arc<dyn PurchaseOrderStore>,
    payments: Arc<dyn PaymentGateway>,
    payer_bank_name: String,
}

impl LogisticsPaymentCommand {
    pub fn new(
        order: PurchaseOrder,
        store: Arc<dyn PurchaseOrderStore>,
        payments: Arc<dyn PaymentGateway>,
        payer_bank_name: impl Into<String>,
    ) -> Self {
        Self {
            order,
            store,
            payments,
            payer_bank_name: payer_bank_name.into(),
        }
    }
}

#[async_trait]
impl FulfillmentCommand for LogisticsPaymentCommand {
    fn action(&self) -> &'static str {
        "logistics_payment"
    }

    async fn execute(&self) -> CommandOutcome {
        // Both fields are written by the shipping step before this status is
        // ever set; their absence means the record was tampered with.
        let Some(shipper_account) = self.order.shipper_account.as_deref() else {
            return CommandOutcome::fatal(format!(
                "order {} awaits logistics payment but has no shipper bank account",
                self.order.id
            ));
        };
        let Some(shipment_id) = self.order.shipment_id.as_deref() else {
            return CommandOutcome::fatal(format!(
                "order {} awaits logistics payment but has no shipment id",
                self.order.id
            ));
        };

        let payment = match self
            .payments
            .make_payment(
                shipper_account,
                &self.payer_bank_name,
                self.order.shipping_price_cents,
                shipment_id,
            )
            .await
        {
            Ok(payment) => payment,
            Err(e) => return CommandOutcome::retryable(format!("{:#}", e)),
        };

        if !payment.success {
            return CommandOutcome::retryable(
                payment
                    .message
                    .unwrap_or_else(|| "payment declined by banking service".to_string()),
            );
        }

        match self
            .store
            .update_status(self.order.id, OrderStatus::WaitingForDelivery)
            .await
        {
            Ok(true) => {
                tracing::info!(
                    order_id = %self.order.id,
                    shipment_id = %shipment_id,
                    amount_cents = self.order.shipping_price_cents,
                    "Shipper paid, order awaiting delivery"
                );
                CommandOutcome::succeeded()
            }
            Ok(false) => CommandOutcome::fatal(format!(
                "order {} vanished from the store after logistics payment",
                self.order.id
            )),
            Err(e) => CommandOutcome::retryable(format!("status update failed: {:#}", e)),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::PaymentResult;
    use crate::domain::{Material, OrderKind};
    use crate::store::MemoryOrderStore;
    use std::sync::Mutex;

    struct RecordingPayments {
        approve: bool,
        calls: Mutex<Vec<(String, i64, String)>>,
    }

    impl RecordingPayments {
        fn new(approve: bool) -> Arc<Self> {
            Arc::new(Self {
                approve,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PaymentGateway for RecordingPayments {
        async fn make_payment(
            &self,
            to_account: &str,
            _to_bank_name: &str,
            amount_cents: i64,
            description: &str,
        ) -> anyhow::Result<PaymentResult> {
            self.calls.lock().unwrap().push((
                to_account.to_string(),
                amount_cents,
                description.to_string(),
            ));
            Ok(PaymentResult {
                success: self.approve,
                message: (!self.approve).then(|| "declined".to_string()),
            })
        }
    }

    fn shipped_order() -> PurchaseOrder {
        let mut order =
            PurchaseOrder::new(OrderKind::Material(Material::Sand), 100, 50, "SUP-ACC-1")
                .unwrap();
        order.status = OrderStatus::RequiresPaymentToLogistics;
        order.shipper_account = Some("ACC-9".to_string());
        order.shipment_id = Some("SHIP-1".to_string());
        order.shipping_price_cents = 200;
        order
    }

    #[tokio::test]
    async fn test_shipper_payment_advances_to_waiting_for_delivery() {
        let store = MemoryOrderStore::new();
        let order = shipped_order();
        store.insert(order.clone()).await.unwrap();
        let payments = RecordingPayments::new(true);

        let outcome = LogisticsPaymentCommand::new(
            order.clone(),
            store.clone(),
            payments.clone(),
            "manufacturer-bank",
        )
        .execute()
        .await;

        assert!(outcome.success);
        let stored = store.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::WaitingForDelivery);

        // Paid to the shipper, shipment id as the description
        let calls = payments.calls.lock().unwrap();
        assert_eq!(calls[0], ("ACC-9".to_string(), 200, "SHIP-1".to_string()));
    }

    #[tokio::test]
    async fn test_declined_shipper_payment_is_retryable() {
        let store = MemoryOrderStore::new();
        let order = shipped_order();
        store.insert(order.clone()).await.unwrap();
        let payments = RecordingPayments::new(false);

        let outcome =
            LogisticsPaymentCommand::new(order.clone(), store.clone(), payments, "manufacturer-bank")
                .execute()
                .await;

        assert!(!outcome.success);
        assert!(outcome.should_retry);
        let stored = store.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::RequiresPaymentToLogistics);
    }

    #[tokio::test]
    async fn test_missing_shipment_linkage_is_fatal() {
        let store = MemoryOrderStore::new();
        let mut order = shipped_order();
        order.shipment_id = None;
        store.insert(order.clone()).await.unwrap();
        let payments = RecordingPayments::new(true);

        let outcome =
            LogisticsPaymentCommand::new(order, store, payments.clone(), "manufacturer-bank")
                .execute()
                .await;

        assert!(outcome.is_fatal());
        // The banking service is never called for a corrupt record
        assert!(payments.calls.lock().unwrap().is_empty());
    }
}
