use async_trait::async_trait;

use crate::domain::OrderStatus;

use super::{CommandOutcome, FulfillmentCommand};

// ============================================================================
// No-Op Command
// ============================================================================
//
// The safety valve for statuses this pipeline does not drive: terminal
// states, the screen-order lifecycle, and anything added to the vocabulary
// later. Always succeeds, never touches the store.
//
// ============================================================================

pub struct NoOpCommand {
    status: OrderStatus,
}

impl NoOpCommand {
    pub fn new(status: OrderStatus) -> Self {
        Self { status }
    }
}

#[async_trait]
impl FulfillmentCommand for NoOpCommand {
    fn action(&self) -> &'static str {
        "no_op"
    }

    async fn execute(&self) -> CommandOutcome {
        tracing::debug!(status = %self.status, "No action for status");
        CommandOutcome::succeeded()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_op_always_succeeds() {
        for status in [
            OrderStatus::Delivered,
            OrderStatus::Abandoned,
            OrderStatus::WaitingForPayment,
            OrderStatus::Collected,
        ] {
            let outcome = NoOpCommand::new(status).execute().await;
            assert!(outcome.success);
            assert!(!outcome.should_retry);
            assert!(outcome.error.is_none());
        }
    }
}
