use async_trait::async_trait;

// ============================================================================
// Fulfillment Commands
// ============================================================================
//
// One command per actionable lifecycle state. A command is constructed bound
// to one purchase order and its collaborators, performs exactly one
// side-effecting step, then advances the order's status. The order's status
// is untouched while a command runs, so re-executing after a failure is
// always safe from the pipeline's perspective.
//
// ============================================================================

// Private module declarations
mod dispatch;
mod logistics_payment;
mod no_op;
mod shipping_request;
mod supplier_payment;

pub use dispatch::CommandDispatch;
pub use logistics_payment::LogisticsPaymentCommand;
pub use no_op::NoOpCommand;
pub use shipping_request::ShippingRequestCommand;
pub use supplier_payment::SupplierPaymentCommand;

/// Result of one command execution.
///
/// `success` and `should_retry` are mutually exclusive: a successful step is
/// never retried, and `should_retry` marks only failures deemed transient.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub should_retry: bool,
}

impl CommandOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            error: None,
            should_retry: false,
        }
    }

    /// Transient failure; the queue keeps the item for the next pass.
    pub fn retryable(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            should_retry: true,
        }
    }

    /// Permanent failure; retrying cannot help without manual intervention.
    pub fn fatal(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            should_retry: false,
        }
    }

    pub fn is_fatal(&self) -> bool {
        !self.success && !self.should_retry
    }
}

#[async_trait]
pub trait FulfillmentCommand: Send + Sync {
    /// Stable action name for logs and metrics.
    fn action(&self) -> &'static str;

    async fn execute(&self) -> CommandOutcome;
}

// ============================================================================
// Unit Tests
// ============================================================================
