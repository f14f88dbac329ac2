use std::sync::Arc;

use async_trait::async_trait;

use crate::collaborators::PaymentGateway;
use crate::domain::{OrderStatus, PurchaseOrder};
use crate::store::PurchaseOrderStore;

use super::{CommandOutcome, FulfillmentCommand};

// ============================================================================
// Supplier Payment Command
// ============================================================================
//
// Handles `RequiresPaymentToSupplier`: pays the seller the full order value
// and advances the order to `RequiresDelivery`.
//
// ============================================================================

pub struct SupplierPaymentCommand {
    order: PurchaseOrder,
    store: Arc<dyn PurchaseOrderStore>,
    payments: Arc<dyn PaymentGateway>,
    payer_bank_name: String,
}

impl SupplierPaymentCommand {
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
impl FulfillmentCommand for SupplierPaymentCommand {
    fn action(&self) -> &'static str {
        "supplier_payment"
    }

    async fn execute(&self) -> CommandOutcome {
        let total = self.order.total_price_cents();

        let payment = match self
            .payments
            .make_payment(
                &self.order.seller_account,
                &self.payer_bank_name,
                total,
                &self.order.reference,
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
            .update_status(self.order.id, OrderStatus::RequiresDelivery)
            .await
        {
            Ok(true) => {
                tracing::info!(
                    order_id = %self.order.id,
                    reference = %self.order.reference,
                    amount_cents = total,
                    "Supplier paid, order awaiting delivery arrangement"
                );
                CommandOutcome::succeeded()
            }
            Ok(false) => CommandOutcome::fatal(format!(
                "order {} vanished from the store after payment",
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
    use anyhow::anyhow;
    use std::sync::Mutex;

    enum PaymentScript {
        Approve,
        Decline(&'static str),
        Unreachable(&'static str),
    }

    struct StubPayments {
        script: PaymentScript,
        calls: Mutex<Vec<(String, String, i64, String)>>,
    }

    impl StubPayments {
        fn new(script: PaymentScript) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PaymentGateway for StubPayments {
        async fn make_payment(
            &self,
            to_account: &str,
            to_bank_name: &str,
            amount_cents: i64,
            description: &str,
        ) -> anyhow::Result<PaymentResult> {
            self.calls.lock().unwrap().push((
                to_account.to_string(),
                to_bank_name.to_string(),
                amount_cents,
                description.to_string(),
            ));
            match &self.script {
                PaymentScript::Approve => Ok(PaymentResult {
                    success: true,
                    message: None,
                }),
                PaymentScript::Decline(msg) => Ok(PaymentResult {
                    success: false,
                    message: Some((*msg).to_string()),
                }),
                PaymentScript::Unreachable(msg) => Err(anyhow!(*msg)),
            }
        }
    }

    async fn stored_order(store: &Arc<MemoryOrderStore>) -> PurchaseOrder {
        let order =
            PurchaseOrder::new(OrderKind::Material(Material::Sand), 100, 50, "SUP-ACC-1")
                .unwrap();
        store.insert(order.clone()).await.unwrap();
        order
    }

    #[tokio::test]
    async fn test_successful_payment_advances_to_requires_delivery() {
        let store = MemoryOrderStore::new();
        let order = stored_order(&store).await;
        let payments = StubPayments::new(PaymentScript::Approve);

        let command = SupplierPaymentCommand::new(
            order.clone(),
            store.clone(),
            payments.clone(),
            "manufacturer-bank",
        );
        let outcome = command.execute().await;

        assert!(outcome.success);
        let stored = store.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::RequiresDelivery);

        // quantity 100 x unit price 50 paid to the seller, reference quoted
        let calls = payments.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "SUP-ACC-1");
        assert_eq!(calls[0].1, "manufacturer-bank");
        assert_eq!(calls[0].2, 5_000);
        assert_eq!(calls[0].3, order.reference);
    }

    #[tokio::test]
    async fn test_declined_payment_is_retryable_with_gateway_message() {
        let store = MemoryOrderStore::new();
        let order = stored_order(&store).await;
        let payments = StubPayments::new(PaymentScript::Decline("insufficient funds"));

        let command =
            SupplierPaymentCommand::new(order.clone(), store.clone(), payments, "manufacturer-bank");
        let outcome = command.execute().await;

        assert!(!outcome.success);
        assert!(outcome.should_retry);
        assert_eq!(outcome.error.as_deref(), Some("insufficient funds"));

        // Status untouched on failure
        let stored = store.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::RequiresPaymentToSupplier);
    }

    #[tokio::test]
    async fn test_transport_error_is_retryable() {
        let store = MemoryOrderStore::new();
        let order = stored_order(&store).await;
        let payments = StubPayments::new(PaymentScript::Unreachable("connection refused"));

        let command =
            SupplierPaymentCommand::new(order.clone(), store.clone(), payments, "manufacturer-bank");
        let outcome = command.execute().await;

        assert!(!outcome.success);
        assert!(outcome.should_retry);
        let stored = store.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::RequiresPaymentToSupplier);
    }

    #[tokio::test]
    async fn test_vanished_order_is_fatal() {
        let store = MemoryOrderStore::new();
        // Order never inserted: the status update will find nothing
        let order =
            PurchaseOrder::new(OrderKind::Material(Material::Sand), 10, 5, "SUP-ACC-1").unwrap();
        let payments = StubPayments::new(PaymentScript::Approve);

        let command = SupplierPaymentCommand::new(order, store, payments, "manufacturer-bank");
        let outcome = command.execute().await;

        assert!(outcome.is_fatal());
    }
}
