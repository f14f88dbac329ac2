use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use async_trait::async_trait;

use crate::utils::BreakerState;

use super::{
    CollaboratorProbe, LogisticsGateway, PaymentGateway, PaymentResult, PickupConfirmation,
    PickupRequest,
};

// ============================================================================
// Simulated Collaborators
// ============================================================================
//
// In-process stand-ins used when no banking/logistics URL is configured.
// Deterministic: payments for positive amounts are approved, pickups get
// sequential shipment ids and a weight-derived cost.
//
// ============================================================================

const SIMULATED_LOGISTICS_ACCOUNT: &str = "SIM-LOGISTICS-ACC";
const COST_CENTS_PER_MANIFEST_UNIT: i64 = 2;

#[derive(Default)]
pub struct SimulatedPaymentGateway;

impl SimulatedPaymentGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
    async fn make_payment(
        &self,
        to_account: &str,
        to_bank_name: &str,
        amount_cents: i64,
        description: &str,
    ) -> Result<PaymentResult> {
        if amount_cents <= 0 {
            return Ok(PaymentResult {
                success: false,
                message: Some(format!("invalid amount: {}", amount_cents)),
            });
        }

        tracing::info!(
            to_account = %to_account,
            to_bank_name = %to_bank_name,
            amount_cents = amount_cents,
            description = %description,
            "Simulated payment approved"
        );

        Ok(PaymentResult {
            success: true,
            message: None,
        })
    }
}

#[async_trait]
impl CollaboratorProbe for SimulatedPaymentGateway {
    fn service(&self) -> &'static str {
        "banking"
    }

    async fn breaker_state(&self) -> BreakerState {
        BreakerState::Closed
    }
}

#[derive(Default)]
pub struct SimulatedLogisticsGateway {
    next_shipment: AtomicU64,
}

impl SimulatedLogisticsGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LogisticsGateway for SimulatedLogisticsGateway {
    async fn request_pickup(&self, request: PickupRequest) -> Result<PickupConfirmation> {
        let seq = self.next_shipment.fetch_add(1, Ordering::SeqCst) + 1;
        let total_units: i64 = request.items.iter().map(|i| i.quantity).sum();

        let confirmation = PickupConfirmation {
            shipment_id: format!("SHIP-{}", seq),
            bank_account: SIMULATED_LOGISTICS_ACCOUNT.to_string(),
            cost_cents: total_units * COST_CENTS_PER_MANIFEST_UNIT,
        };

        tracing::info!(
            external_order_id = %request.external_order_id,
            shipment_id = %confirmation.shipment_id,
            cost_cents = confirmation.cost_cents,
            "Simulated pickup arranged"
        );

        Ok(confirmation)
    }
}

#[async_trait]
impl CollaboratorProbe for SimulatedLogisticsGateway {
    fn service(&self) -> &'static str {
        "logistics"
    }

    async fn breaker_state(&self) -> BreakerState {
        BreakerState::Closed
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
