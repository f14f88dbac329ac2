use super::value_objects::OrderStatus;
use uuid::Uuid;

// ============================================================================
// Purchase Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Purchase order not found: {0}")]
    NotFound(Uuid),

    #[error("Order quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    #[error("Delivery quantity must be positive, got {0}")]
    InvalidDeliveryQuantity(i64),

    #[error("Delivery of {attempted} exceeds outstanding quantity {outstanding}")]
    DeliveryExceedsOrdered { attempted: i64, outstanding: i64 },

    #[error("Cannot record a delivery against an order in status {0}")]
    NotAwaitingDelivery(OrderStatus),
}
