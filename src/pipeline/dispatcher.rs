use std::sync::Arc;

use actix::prelude::*;

use crate::config::PipelineConfig;

use super::processor::PipelineProcessor;

// ============================================================================
// Dispatcher Actor - Drives the work queue
// ============================================================================
//
// On start: bootstrap the queue from the record store, run a first pass,
// then repeat a pass every process interval. A pass never raises, and a
// bootstrap failure only costs the recovery of pre-restart work; the
// schedule keeps ticking either way.
//
// The on-demand trigger does not go through this actor: the boundary calls
// the processor directly and the processor's pass lock serializes both.
//
// ============================================================================

pub struct DispatcherActor {
    processor: Arc<PipelineProcessor>,
    config: PipelineConfig,
}

impl DispatcherActor {
    pub fn new(processor: Arc<PipelineProcessor>, config: PipelineConfig) -> Self {
        Self { processor, config }
    }
}

impl Actor for DispatcherActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(
            interval_secs = self.config.process_interval.as_secs(),
            background_enabled = self.config.background_enabled,
            "DispatcherActor started"
        );

        let processor = self.processor.clone();
        actix::spawn(async move {
            if let Err(e) = processor.populate_from_store().await {
                tracing::error!(
                    error = %format!("{:#}", e),
                    "Queue bootstrap failed, continuing with an empty queue"
                );
            }
            processor.process_all().await;
        });

        if !self.config.background_enabled {
            tracing::warn!("Background processing disabled, only manual triggers will run");
            return;
        }

        ctx.run_interval(self.config.process_interval, |act, _ctx| {
            let processor = act.processor.clone();
            actix::spawn(async move {
                processor.process_all().await;
            });
        });
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        tracing::info!("DispatcherActor stopped");
    }
}
