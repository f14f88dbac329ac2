use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::utils::{BreakerError, BreakerState, CircuitBreaker, CircuitBreakerConfig};

use super::{CollaboratorProbe, PaymentGateway, PaymentResult};

// ============================================================================
// Banking Service Client
// ============================================================================

pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    circuit_breaker: CircuitBreaker,
}

#[derive(Serialize)]
struct PaymentBody<'a> {
    to_account: &'a str,
    to_bank_name: &'a str,
    amount_cents: i64,
    description: &'a str,
}

impl HttpPaymentGateway {
    /// `call_timeout` bounds every request so a stalled banking service
    /// cannot block queue processing past one dispatch interval.
    pub fn new(base_url: impl Into<String>, call_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(call_timeout)
            .build()
            .context("failed to build banking HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            circuit_breaker: CircuitBreaker::new("banking", CircuitBreakerConfig::default()),
        })
    }
}

#[async_trait]
impl CollaboratorProbe for HttpPaymentGateway {
    fn service(&self) -> &'static str {
        "banking"
    }

    async fn breaker_state(&self) -> BreakerState {
        self.circuit_breaker.state().await
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn make_payment(
        &self,
        to_account: &str,
        to_bank_name: &str,
        amount_cents: i64,
        description: &str,
    ) -> Result<PaymentResult> {
        let url = format!("{}/payments", self.base_url);
        let body = PaymentBody {
            to_account,
            to_bank_name,
            amount_cents,
            description,
        };

        let result = self
            .circuit_breaker
            .call(async {
                let response = self
                    .client
                    .post(&url)
                    .json(&body)
                    .send()
                    .await
                    .context("banking service unreachable")?;

                let status = response.status();
                if !status.is_success() {
                    return Err(anyhow!("banking service returned {}", status));
                }

                response
                    .json::<PaymentResult>()
                    .await
                    .context("malformed banking service response")
            })
            .await;

        match result {
            Ok(payment) => {
                tracing::info!(
                    to_account = %to_account,
                    amount_cents = amount_cents,
                    description = %description,
                    success = payment.success,
                    "Banking service responded"
                );
                Ok(payment)
            }
            Err(BreakerError::Open) => {
                tracing::warn!(description = %description, "Banking circuit breaker open");
                Err(anyhow!("banking circuit breaker open"))
            }
            Err(BreakerError::Inner(e)) => {
                tracing::error!(error = %e, description = %description, "Payment call failed");
                Err(e)
            }
        }
    }
}
