use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

use crate::utils::{BreakerError, BreakerState, CircuitBreaker, CircuitBreakerConfig};

use super::{CollaboratorProbe, LogisticsGateway, PickupConfirmation, PickupRequest};

// ============================================================================
// Logistics Service Client
// ============================================================================

pub struct HttpLogisticsGateway {
    client: reqwest::Client,
    base_url: String,
    circuit_breaker: CircuitBreaker,
}

impl HttpLogisticsGateway {
    pub fn new(base_url: impl Into<String>, call_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(call_timeout)
            .build()
            .context("failed to build logistics HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            circuit_breaker: CircuitBreaker::new("logistics", CircuitBreakerConfig::default()),
        })
    }
}

#[async_trait]
impl CollaboratorProbe for HttpLogisticsGateway {
    fn service(&self) -> &'static str {
        "logistics"
    }

    async fn breaker_state(&self) -> BreakerState {
        self.circuit_breaker.state().await
    }
}

#[async_trait]
impl LogisticsGateway for HttpLogisticsGateway {
    async fn request_pickup(&self, request: PickupRequest) -> Result<PickupConfirmation> {
        let url = format!("{}/pickups", self.base_url);

        let result = self
            .circuit_breaker
            .call(async {
                let response = self
                    .client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .context("logistics service unreachable")?;

                let status = response.status();
                if !status.is_success() {
                    return Err(anyhow!("logistics service returned {}", status));
                }

                response
                    .json::<PickupConfirmation>()
                    .await
                    .context("malformed logistics service response")
            })
            .await;

        match result {
            Ok(confirmation) => {
                tracing::info!(
                    external_order_id = %request.external_order_id,
                    shipment_id = %confirmation.shipment_id,
                    cost_cents = confirmation.cost_cents,
                    "Pickup arranged"
                );
                Ok(confirmation)
            }
            Err(BreakerError::Open) => {
                tracing::warn!(
                    external_order_id = %request.external_order_id,
                    "Logistics circuit breaker open"
                );
                Err(anyhow!("logistics circuit breaker open"))
            }
            Err(BreakerError::Inner(e)) => {
                tracing::error!(
                    error = %e,
                    external_order_id = %request.external_order_id,
                    "Pickup request failed"
                );
                Err(e)
            }
        }
    }
}
