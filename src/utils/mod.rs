pub mod circuit_breaker;

pub use circuit_breaker::{BreakerError, BreakerState, CircuitBreaker, CircuitBreakerConfig};
