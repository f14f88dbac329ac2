use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Covers the pipeline's moving parts:
// - queue depth and dispatch passes
// - command executions (per action, per outcome) and their latency
// - retries and abandoned orders
// - reorder-monitor order creation
// - collaborator circuit breaker state
//
// Scraped via GET /metrics on the boundary server.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Queue / dispatch loop
    pub queue_depth: IntGauge,
    pub dispatch_passes: IntCounter,

    // Command execution
    pub commands_executed: IntCounterVec,
    pub command_duration: HistogramVec,

    // Failure handling
    pub retries_scheduled: IntCounterVec,
    pub orders_abandoned: IntCounter,

    // Reorder monitor
    pub reorder_orders_created: IntCounterVec,

    // Collaborators
    pub breaker_state: IntGaugeVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let queue_depth = IntGauge::new(
            "pipeline_queue_depth",
            "Purchase orders currently awaiting processing",
        )?;
        registry.register(Box::new(queue_depth.clone()))?;

        let dispatch_passes = IntCounter::new(
            "pipeline_dispatch_passes_total",
            "Completed drain-and-process passes",
        )?;
        registry.register(Box::new(dispatch_passes.clone()))?;

        let commands_executed = IntCounterVec::new(
            Opts::new(
                "pipeline_commands_executed_total",
                "Command executions by action and outcome",
            ),
            &["action", "outcome"],
        )?;
        registry.register(Box::new(commands_executed.clone()))?;

        let command_duration = HistogramVec::new(
            HistogramOpts::new(
                "pipeline_command_duration_seconds",
                "Command execution duration",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]),
            &["action"],
        )?;
        registry.register(Box::new(command_duration.clone()))?;

        let retries_scheduled = IntCounterVec::new(
            Opts::new(
                "pipeline_retries_scheduled_total",
                "Items left queued for another pass after a transient failure",
            ),
            &["action"],
        )?;
        registry.register(Box::new(retries_scheduled.clone()))?;

        let orders_abandoned = IntCounter::new(
            "pipeline_orders_abandoned_total",
            "Orders flagged Abandoned after fatal failure or retry exhaustion",
        )?;
        registry.register(Box::new(orders_abandoned.clone()))?;

        let reorder_orders_created = IntCounterVec::new(
            Opts::new(
                "reorder_orders_created_total",
                "Purchase orders created by the reorder monitor",
            ),
            &["resource"],
        )?;
        registry.register(Box::new(reorder_orders_created.clone()))?;

        let breaker_state = IntGaugeVec::new(
            Opts::new(
                "collaborator_circuit_breaker_state",
                "Circuit breaker state per collaborator (0=closed, 1=open, 2=half-open)",
            ),
            &["service"],
        )?;
        registry.register(Box::new(breaker_state.clone()))?;

        Ok(Self {
            registry,
            queue_depth,
            dispatch_passes,
            commands_executed,
            command_duration,
            retries_scheduled,
            orders_abandoned,
            reorder_orders_created,
            breaker_state,
        })
    }

    /// Registry handle for the /metrics exposition endpoint.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_command(&self, action: &str, outcome: &str, duration_secs: f64) {
        self.commands_executed
            .with_label_values(&[action, outcome])
            .inc();
        self.command_duration
            .with_label_values(&[action])
            .observe(duration_secs);
    }

    pub fn record_retry(&self, action: &str) {
        self.retries_scheduled.with_label_values(&[action]).inc();
    }

    pub fn record_abandoned(&self) {
        self.orders_abandoned.inc();
    }

    pub fn record_reorder(&self, resource: &str) {
        self.reorder_orders_created
            .with_label_values(&[resource])
            .inc();
    }

    pub fn set_queue_depth(&self, depth: usize) {
        self.queue_depth.set(depth as i64);
    }

    pub fn set_breaker_state(&self, service: &str, state: u8) {
        self.breaker_state
            .with_label_values(&[service])
            .set(state as i64);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
