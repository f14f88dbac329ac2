use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

// ============================================================================
// Circuit Breaker
// ============================================================================
//
// Protects the collaborator gateways (banking, logistics) from hammering a
// service that is already failing.
//
// States:
// - Closed: calls pass through
// - Open: calls rejected until the cool-down elapses
// - HalfOpen: a recovered-looking service gets probe calls; enough
//   consecutive successes close the circuit, any failure reopens it
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn name(self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }

    /// Numeric encoding for the breaker-state gauge.
    pub fn code(self) -> u8 {
        match self {
            BreakerState::Closed => 0,
            BreakerState::Open => 1,
            BreakerState::HalfOpen => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip the circuit open.
    pub trip_threshold: u32,
    /// How long the circuit stays open before probing.
    pub cool_down: Duration,
    /// Probe successes needed to close again.
    pub close_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            trip_threshold: 5,
            cool_down: Duration::from_secs(30),
            close_threshold: 2,
        }
    }
}

struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    probe_successes: u32,
    opened_at: Option<Instant>,
}

/// A named breaker guarding one external service.
#[derive(Clone)]
pub struct CircuitBreaker {
    service: &'static str,
    inner: Arc<Mutex<BreakerInner>>,
    config: CircuitBreakerConfig,
}

#[derive(Debug)]
pub enum BreakerError<E> {
    /// Rejected without calling the service.
    Open,
    /// The service was called and failed.
    Inner(E),
}

impl<E: std::fmt::Display> std::fmt::Display for BreakerError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakerError::Open => write!(f, "circuit breaker is open"),
            BreakerError::Inner(e) => write!(f, "call failed: {}", e),
        }
    }
}

impl<E: std::error::Error> std::error::Error for BreakerError<E> {}

impl CircuitBreaker {
    pub fn new(service: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            service,
            inner: Arc::new(Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                probe_successes: 0,
                opened_at: None,
            })),
            config,
        }
    }

    /// Run `operation` under breaker protection.
    pub async fn call<F, T, E>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: std::future::Future<Output = Result<T, E>>,
    {
        {
            let mut inner = self.inner.lock().await;
            if inner.state == BreakerState::Open {
                let cooled = inner
                    .opened_at
                    .map(|t| t.elapsed() >= self.config.cool_down)
                    .unwrap_or(true);
                if cooled {
                    tracing::info!(service = self.service, "Circuit breaker probing (half-open)");
                    inner.state = BreakerState::HalfOpen;
                    inner.probe_successes = 0;
                } else {
                    return Err(BreakerError::Open);
                }
            }
        }

        match operation.await {
            Ok(value) => {
                self.on_success().await;
                Ok(value)
            }
            Err(err) => {
                self.on_failure().await;
                Err(BreakerError::Inner(err))
            }
        }
    }

    async fn on_success(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            BreakerState::HalfOpen => {
                inner.probe_successes += 1;
                if inner.probe_successes >= self.config.close_threshold {
                    tracing::info!(
                        service = self.service,
                        probes = inner.probe_successes,
                        "Circuit breaker closed"
                    );
                    inner.state = BreakerState::Closed;
                    inner.consecutive_failures = 0;
                    inner.probe_successes = 0;
                    inner.opened_at = None;
                }
            }
            BreakerState::Closed => {
                inner.consecutive_failures = 0;
            }
            BreakerState::Open => {}
        }
    }

    async fn on_failure(&self) {
        let mut inner = self.inner.lock().await;
        inner.consecutive_failures += 1;

        match inner.state {
            BreakerState::Closed => {
                if inner.consecutive_failures >= self.config.trip_threshold {
                    tracing::warn!(
                        service = self.service,
                        failures = inner.consecutive_failures,
                        "Circuit breaker tripped open"
                    );
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
            BreakerState::HalfOpen => {
                tracing::warn!(service = self.service, "Probe failed, circuit reopened");
                inner.state = BreakerState::Open;
                inner.probe_successes = 0;
                inner.opened_at = Some(Instant::now());
            }
            BreakerState::Open => {
                inner.opened_at = Some(Instant::now());
            }
        }
    }

    pub async fn state(&self) -> BreakerState {
        self.inner.lock().await.state
    }

    pub fn service(&self) -> &'static str {
        self.service
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(trip: u32, cool_down_ms: u64, close: u32) -> CircuitBreaker {
        CircuitBreaker::new(
            "test",
            CircuitBreakerConfig {
                trip_threshold: trip,
                cool_down: Duration::from_millis(cool_down_ms),
                close_threshold: close,
            },
        )
    }

    #[tokio::test]
    async fn test_trips_open_after_consecutive_failures() {
        let cb = breaker(3, 1_000, 2);

        for _ in 0..3 {
            let result = cb.call(async { Err::<(), _>("boom") }).await;
            assert!(result.is_err());
        }
        assert_eq!(cb.state().await, BreakerState::Open);

        // Rejected without touching the service
        let result = cb.call(async { Ok::<_, &str>(()) }).await;
        assert!(matches!(result, Err(BreakerError::Open)));
    }

    #[tokio::test]
    async fn test_success_resets_failure_streak() {
        let cb = breaker(3, 1_000, 2);

        let _ = cb.call(async { Err::<(), _>("boom") }).await;
        let _ = cb.call(async { Err::<(), _>("boom") }).await;
        let _ = cb.call(async { Ok::<_, &str>(()) }).await;
        let _ = cb.call(async { Err::<(), _>("boom") }).await;

        // Streak was broken, so three total failures do not trip it
        assert_eq!(cb.state().await, BreakerState::Closed);
    }

    #[tokio::test]
    async fn test_probes_after_cool_down_and_closes() {
        let cb = breaker(2, 50, 2);

        for _ in 0..2 {
            let _ = cb.call(async { Err::<(), _>("boom") }).await;
        }
        assert_eq!(cb.state().await, BreakerState::Open);

        tokio::time::sleep(Duration::from_millis(80)).await;

        // First probe passes through
        assert!(cb.call(async { Ok::<_, &str>(()) }).await.is_ok());
        assert_eq!(cb.state().await, BreakerState::HalfOpen);

        // Second success closes
        assert!(cb.call(async { Ok::<_, &str>(()) }).await.is_ok());
        assert_eq!(cb.state().await, BreakerState::Closed);
    }

    #[tokio::test]
    async fn test_probe_failure_reopens() {
        let cb = breaker(1, 50, 1);

        let _ = cb.call(async { Err::<(), _>("boom") }).await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        let _ = cb.call(async { Err::<(), _>("still down") }).await;
        assert_eq!(cb.state().await, BreakerState::Open);
    }
}
