use std::sync::Arc;

use actix::Addr;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use chrono::Utc;
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::OrderError;
use crate::metrics::Metrics;
use crate::pipeline::health::{GetSystemHealth, HealthActor};
use crate::pipeline::{DeliveryIntake, PipelineProcessor, ReorderMonitor};
use crate::store::PurchaseOrderStore;

// ============================================================================
// Boundary Server
// ============================================================================
//
// The HTTP surface of the pipeline:
// - GET  /queue                  pending count + item bookkeeping
// - POST /queue/process          run one dispatch pass synchronously
// - POST /reorder/run            run the reorder monitor on demand
// - GET  /orders/{id}            order snapshot
// - POST /orders/{id}/deliveries record a delivery
// - GET  /health                 aggregated component health
// - GET  /metrics                Prometheus exposition
//
// ============================================================================

pub struct AppState {
    pub processor: Arc<PipelineProcessor>,
    pub reorder: Arc<ReorderMonitor>,
    pub delivery: Arc<DeliveryIntake>,
    pub store: Arc<dyn PurchaseOrderStore>,
    pub metrics: Arc<Metrics>,
    pub health: Option<Addr<HealthActor>>,
}

pub async fn start_boundary_server(state: AppState, port: u16) -> std::io::Result<()> {
    tracing::info!("📡 Starting boundary server on http://0.0.0.0:{}", port);

    let state = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/queue", web::get().to(queue_handler))
            .route("/queue/process", web::post().to(process_handler))
            .route("/reorder/run", web::post().to(reorder_handler))
            .route("/orders/{id}", web::get().to(order_handler))
            .route("/orders/{id}/deliveries", web::post().to(delivery_handler))
            .route("/health", web::get().to(health_handler))
            .route("/metrics", web::get().to(metrics_handler))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn queue_handler(state: web::Data<AppState>) -> impl Responder {
    let items = state.processor.queue().snapshot_items().await;
    HttpResponse::Ok().json(serde_json::json!({
        "pending": items.len(),
        "items": items,
        "timestamp": Utc::now(),
    }))
}

async fn process_handler(state: web::Data<AppState>) -> impl Responder {
    let pending_before = state.processor.pending_count().await;
    let summary = state.processor.process_all().await;
    let pending_after = state.processor.pending_count().await;

    HttpResponse::Ok().json(serde_json::json!({
        "pending_before": pending_before,
        "pending_after": pending_after,
        "summary": summary,
        "timestamp": Utc::now(),
    }))
}

async fn reorder_handler(state: web::Data<AppState>) -> impl Responder {
    match state.reorder.run().await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("{:#}", e),
        })),
    }
}

async fn order_handler(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();
    match state.store.find_by_id(id).await {
        Ok(Some(order)) => HttpResponse::Ok().json(order),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("no purchase order {}", id),
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("{:#}", e),
        })),
    }
}

#[derive(Deserialize)]
struct DeliveryBody {
    quantity: i64,
}

async fn delivery_handler(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<DeliveryBody>,
) -> impl Responder {
    let id = path.into_inner();
    match state.delivery.record_delivery(id, body.quantity).await {
        Ok(order) => HttpResponse::Ok().json(order),
        Err(e) => match e.downcast_ref::<OrderError>() {
            Some(OrderError::NotFound(_)) => HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("{:#}", e),
            })),
            Some(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("{:#}", e),
            })),
            None => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("{:#}", e),
            })),
        },
    }
}

async fn health_handler(state: web::Data<AppState>) -> impl Responder {
    match &state.health {
        Some(health) => match health.send(GetSystemHealth).await {
            Ok(system) => HttpResponse::Ok().json(system),
            Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("health actor unavailable: {}", e),
            })),
        },
        None => HttpResponse::Ok().json(serde_json::json!({
            "status": "unknown",
        })),
    }
}

async fn metrics_handler(state: web::Data<AppState>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(format!("metrics encoding failed: {}", e));
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

// ============================================================================
// Unit Tests
// ============================================================================
