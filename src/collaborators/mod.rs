use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// External Collaborators
// ============================================================================
//
// The two side-effecting services the pipeline commands call: the banking
// service (payments) and the logistics service (pickup requests). Each trait
// has an HTTP implementation (circuit-broken, bounded timeout) and a
// simulated in-process implementation used when no service URL is
// configured.
//
// ============================================================================

// Private module declarations
mod banking;
mod logistics;
mod simulated;

pub use banking::HttpPaymentGateway;
pub use logistics::HttpLogisticsGateway;
pub use simulated::{SimulatedLogisticsGateway, SimulatedPaymentGateway};

/// Manifest units understood by the logistics service.
pub const UNIT_KILOGRAM: &str = "KG";
pub const UNIT_PIECE: &str = "UNIT";

/// Outcome reported by the banking service. A declined payment is a normal
/// response, not a transport error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResult {
    pub success: bool,
    pub message: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn make_payment(
        &self,
        to_account: &str,
        to_bank_name: &str,
        amount_cents: i64,
        description: &str,
    ) -> Result<PaymentResult>;
}

/// One line on a pickup manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupItem {
    pub name: String,
    pub quantity: i64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupRequest {
    pub origin_company: String,
    pub destination_company: String,
    pub external_order_id: String,
    pub items: Vec<PickupItem>,
}

/// What the logistics service hands back once a pickup is arranged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupConfirmation {
    pub shipment_id: String,
    pub bank_account: String,
    pub cost_cents: i64,
}

#[async_trait]
pub trait LogisticsGateway: Send + Sync {
    /// Arrange a pickup. Fails with an explicit error on any non-success
    /// response from the logistics service.
    async fn request_pickup(&self, request: PickupRequest) -> Result<PickupConfirmation>;
}

/// Liveness view of one collaborator, read by the coordinator's health
/// refresh. HTTP gateways report their circuit breaker; the simulated ones
/// are always closed.
#[async_trait]
pub trait CollaboratorProbe: Send + Sync {
    fn service(&self) -> &'static str;
    async fn breaker_state(&self) -> crate::utils::BreakerState;
}
