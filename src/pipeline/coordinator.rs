use std::sync::Arc;
use std::time::Duration;

use actix::prelude::*;
use futures_util::future::join_all;

use crate::collaborators::CollaboratorProbe;
use crate::config::PipelineConfig;
use crate::metrics::Metrics;

use super::dispatcher::DispatcherActor;
use super::health::{HealthActor, HealthStatus, UpdateHealth};
use super::processor::PipelineProcessor;
use super::reorder::ReorderMonitor;

// ============================================================================
// Coordinator Actor - Orchestrates the pipeline actors
// ============================================================================
//
// Responsibilities:
// - Starts and stops the child actors (DispatcherActor, HealthActor)
// - Schedules reorder-monitor runs: the inventory control loop that feeds
//   new procurement work into the queue
// - Refreshes collaborator health from circuit-breaker state
//
// Actor Hierarchy:
//   CoordinatorActor
//   ├── DispatcherActor
//   └── HealthActor
//
// ============================================================================

const HEALTH_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

pub struct CoordinatorActor {
    processor: Arc<PipelineProcessor>,
    reorder: Arc<ReorderMonitor>,
    probes: Vec<Arc<dyn CollaboratorProbe>>,
    metrics: Arc<Metrics>,
    pipeline_config: PipelineConfig,
    dispatcher: Option<Addr<DispatcherActor>>,
    health: Option<Addr<HealthActor>>,
}

impl CoordinatorActor {
    pub fn new(
        processor: Arc<PipelineProcessor>,
        reorder: Arc<ReorderMonitor>,
        probes: Vec<Arc<dyn CollaboratorProbe>>,
        metrics: Arc<Metrics>,
        pipeline_config: PipelineConfig,
    ) -> Self {
        Self {
            processor,
            reorder,
            probes,
            metrics,
            pipeline_config,
            dispatcher: None,
            health: None,
        }
    }

    fn start_children(&mut self) {
        tracing::info!("Starting pipeline actors");

        let health = HealthActor::new().start();
        self.health = Some(health.clone());

        let dispatcher =
            DispatcherActor::new(self.processor.clone(), self.pipeline_config.clone()).start();
        self.dispatcher = Some(dispatcher);

        health.do_send(UpdateHealth {
            component: "dispatcher".to_string(),
            status: HealthStatus::Healthy,
            details: Some("dispatch loop started".to_string()),
        });

        tracing::info!("✅ All pipeline actors started");
    }

    fn refresh_collaborator_health(&self) {
        let Some(health) = self.health.clone() else {
            return;
        };
        let probes = self.probes.clone();
        let metrics = self.metrics.clone();

        actix::spawn(async move {
            let states = join_all(probes.iter().map(|p| p.breaker_state())).await;
            for (probe, state) in probes.iter().zip(states) {
                metrics.set_breaker_state(probe.service(), state.code());
                health.do_send(UpdateHealth {
                    component: probe.service().to_string(),
                    status: HealthStatus::from_breaker(state),
                    details: Some(format!("circuit breaker {}", state.name())),
                });
            }
        });
    }
}

impl Actor for CoordinatorActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("CoordinatorActor started");
        self.start_children();
        self.refresh_collaborator_health();

        // Inventory control loop, on the same cadence as dispatch
        ctx.run_interval(self.pipeline_config.process_interval, |act, _ctx| {
            let reorder = act.reorder.clone();
            actix::spawn(async move {
                if let Err(e) = reorder.run().await {
                    tracing::error!(
                        error = %format!("{:#}", e),
                        "Reorder check failed, will retry on the next tick"
                    );
                }
            });
        });

        ctx.run_interval(HEALTH_REFRESH_INTERVAL, |act, _ctx| {
            act.refresh_collaborator_health();
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        tracing::info!("CoordinatorActor stopping, shutting down children");
        Running::Stop
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        tracing::info!("CoordinatorActor stopped");
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "()")]
pub struct Shutdown;

impl Handler<Shutdown> for CoordinatorActor {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) {
        tracing::info!("Received shutdown signal");

        if let Some(ref dispatcher) = self.dispatcher {
            dispatcher.do_send(StopActor);
        }
        if let Some(ref health) = self.health {
            health.do_send(StopActor);
        }

        ctx.stop();
    }
}

/// Message to gracefully stop a child actor
#[derive(Message)]
#[rtype(result = "()")]
struct StopActor;

impl Handler<StopActor> for DispatcherActor {
    type Result = ();

    fn handle(&mut self, _: StopActor, ctx: &mut Self::Context) {
        tracing::info!("DispatcherActor received stop signal");
        ctx.stop();
    }
}

impl Handler<StopActor> for HealthActor {
    type Result = ();

    fn handle(&mut self, _: StopActor, ctx: &mut Self::Context) {
        tracing::info!("HealthActor received stop signal");
        ctx.stop();
    }
}

/// Hands the health actor's address to the boundary server.
#[derive(Message)]
#[rtype(result = "Option<Addr<HealthActor>>")]
pub struct GetHealthActor;

impl Handler<GetHealthActor> for CoordinatorActor {
    type Result = Option<Addr<HealthActor>>;

    fn handle(&mut self, _: GetHealthActor, _: &mut Self::Context) -> Self::Result {
        self.health.clone()
    }
}
