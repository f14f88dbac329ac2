use std::sync::Arc;

use actix::Actor;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod collaborators;
mod config;
mod domain;
mod http;
mod metrics;
mod pipeline;
mod store;
mod utils;

use collaborators::{
    CollaboratorProbe, HttpLogisticsGateway, HttpPaymentGateway, LogisticsGateway, PaymentGateway,
    SimulatedLogisticsGateway, SimulatedPaymentGateway,
};
use config::AppConfig;
use domain::{EquipmentParameters, Resource};
use pipeline::commands::CommandDispatch;
use pipeline::coordinator::{GetHealthActor, Shutdown};
use pipeline::{CoordinatorActor, DeliveryIntake, PipelineProcessor, ReorderMonitor, WorkQueue};
use store::{MemoryInventoryStore, MemoryOrderStore};

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging with environment-based filtering; override with
    // RUST_LOG, e.g. RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,supplychain_pipeline=debug")),
        )
        .init();

    tracing::info!("🚀 Starting supply-chain fulfillment pipeline");

    let config = AppConfig::from_env();

    // === 1. Stores: the simulation runs on in-memory records ===
    let store = MemoryOrderStore::with_equipment_parameters(EquipmentParameters { weight: 120 });
    let inventory = MemoryInventoryStore::new([
        (Resource::Sand, 1_000),
        (Resource::Copper, 500),
        (Resource::Equipment, 10),
    ]);

    // === 2. Metrics registry ===
    let metrics = Arc::new(metrics::Metrics::new()?);

    // === 3. Collaborators: HTTP when configured, simulated otherwise ===
    let (payments, payments_probe): (Arc<dyn PaymentGateway>, Arc<dyn CollaboratorProbe>) =
        match &config.banking_url {
            Some(url) => {
                tracing::info!(url = %url, "Using HTTP banking service");
                let gateway = Arc::new(HttpPaymentGateway::new(
                    url.clone(),
                    config.pipeline.collaborator_timeout,
                )?);
                (gateway.clone(), gateway)
            }
            None => {
                tracing::info!("No banking URL configured, using the simulated gateway");
                let gateway = Arc::new(SimulatedPaymentGateway::new());
                (gateway.clone(), gateway)
            }
        };

    let (logistics, logistics_probe): (Arc<dyn LogisticsGateway>, Arc<dyn CollaboratorProbe>) =
        match &config.logistics_url {
            Some(url) => {
                tracing::info!(url = %url, "Using HTTP logistics service");
                let gateway = Arc::new(HttpLogisticsGateway::new(
                    url.clone(),
                    config.pipeline.collaborator_timeout,
                )?);
                (gateway.clone(), gateway)
            }
            None => {
                tracing::info!("No logistics URL configured, using the simulated gateway");
                let gateway = Arc::new(SimulatedLogisticsGateway::new());
                (gateway.clone(), gateway)
            }
        };

    // === 4. The pipeline: one queue, one processor, one monitor ===
    let queue = WorkQueue::new();
    let dispatch = CommandDispatch::new(
        store.clone(),
        payments,
        logistics,
        config.identity.clone(),
    );
    let processor = PipelineProcessor::new(
        queue.clone(),
        store.clone(),
        dispatch,
        config.pipeline.clone(),
        metrics.clone(),
    );
    let reorder = ReorderMonitor::new(
        store.clone(),
        inventory.clone(),
        queue.clone(),
        config.reorder.clone(),
        metrics.clone(),
    );
    let delivery = DeliveryIntake::new(store.clone(), inventory, queue);

    // === 5. Coordinator supervises the dispatch loop and health ===
    let coordinator = CoordinatorActor::new(
        processor.clone(),
        reorder.clone(),
        vec![payments_probe, logistics_probe],
        metrics.clone(),
        config.pipeline.clone(),
    )
    .start();

    let health = coordinator.send(GetHealthActor).await?;

    // === 6. Boundary server; runs until the process is signalled ===
    let state = http::AppState {
        processor,
        reorder,
        delivery,
        store,
        metrics,
        health,
    };
    http::start_boundary_server(state, config.http_port).await?;

    coordinator.send(Shutdown).await.ok();
    tracing::info!("Pipeline stopped");
    Ok(())
}
