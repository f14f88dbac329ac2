use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::domain::OrderStatus;
use crate::metrics::Metrics;
use crate::store::PurchaseOrderStore;

use super::commands::CommandDispatch;
use super::queue::{QueueItem, WorkQueue};

// ============================================================================
// Pipeline Processor
// ============================================================================
//
// Owns one drain-and-process pass: snapshot the queue, and for each order
// load it, resolve its command, execute, then act on the outcome:
// - success        item leaves the queue
// - retryable      retry count up, item stays for the next pass; at the
//                  configured cap the order is flagged Abandoned (unless
//                  abandon_on_exhaustion is off, which retries forever)
// - fatal          item leaves the queue and the order is flagged Abandoned
// - vanished       item leaves the queue; nothing left to flag
//
// Passes are serialized by an internal lock, so a timer tick overlapping a
// manual trigger can never process the same order twice concurrently.
//
// ============================================================================

pub struct PipelineProcessor {
    queue: Arc<WorkQueue>,
    store: Arc<dyn PurchaseOrderStore>,
    dispatch: CommandDispatch,
    config: PipelineConfig,
    metrics: Arc<Metrics>,
    pass_lock: Mutex<()>,
}

/// What one pass did, returned to the manual-trigger boundary.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PassSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub retried: usize,
    pub abandoned: usize,
    pub vanished: usize,
}

enum ItemOutcome {
    Succeeded,
    Retry(QueueItem),
    Abandoned,
    Vanished,
}

impl PipelineProcessor {
    pub fn new(
        queue: Arc<WorkQueue>,
        store: Arc<dyn PurchaseOrderStore>,
        dispatch: CommandDispatch,
        config: PipelineConfig,
        metrics: Arc<Metrics>,
    ) -> Arc<Self> {
        Arc::new(Self {
            queue,
            store,
            dispatch,
            config,
            metrics,
            pass_lock: Mutex::new(()),
        })
    }

    pub fn queue(&self) -> &Arc<WorkQueue> {
        &self.queue
    }

    /// Recover in-flight work across restarts: queue every persisted order
    /// that is not in a terminal state.
    pub async fn populate_from_store(&self) -> Result<usize> {
        let active = self
            .store
            .list_active()
            .await
            .context("loading active purchase orders")?;

        let mut queued = 0;
        for order in &active {
            if self.queue.enqueue(order.id).await {
                queued += 1;
            }
        }

        self.metrics.set_queue_depth(self.queue.len().await);
        tracing::info!(
            active = active.len(),
            queued = queued,
            "Queue populated from the record store"
        );
        Ok(queued)
    }

    /// Run one pass over a snapshot of the pending set. Orders enqueued
    /// while the pass runs are picked up on the next pass.
    pub async fn process_all(&self) -> PassSummary {
        let _pass = self.pass_lock.lock().await;

        let items = self.queue.drain_snapshot().await;
        let mut summary = PassSummary::default();

        for item in items {
            summary.processed += 1;
            match self.process_item(item).await {
                ItemOutcome::Succeeded => summary.succeeded += 1,
                ItemOutcome::Retry(item) => {
                    summary.retried += 1;
                    self.queue.requeue(item).await;
                }
                ItemOutcome::Abandoned => summary.abandoned += 1,
                ItemOutcome::Vanished => summary.vanished += 1,
            }
        }

        self.metrics.dispatch_passes.inc();
        self.metrics.set_queue_depth(self.queue.len().await);

        if summary.processed > 0 {
            tracing::info!(
                processed = summary.processed,
                succeeded = summary.succeeded,
                retried = summary.retried,
                abandoned = summary.abandoned,
                vanished = summary.vanished,
                "Dispatch pass complete"
            );
        }
        summary
    }

    pub async fn pending_count(&self) -> usize {
        self.queue.len().await
    }

    async fn process_item(&self, mut item: QueueItem) -> ItemOutcome {
        let order = match self.store.find_by_id(item.order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                tracing::error!(
                    order_id = %item.order_id,
                    "Queued order no longer exists in the store, dropping"
                );
                return ItemOutcome::Vanished;
            }
            Err(e) => {
                // Store outage: keep the item, the pass and the loop alive
                tracing::error!(
                    order_id = %item.order_id,
                    error = %format!("{:#}", e),
                    "Order lookup failed, keeping item queued"
                );
                item.retry_count += 1;
                item.last_attempt_at = Some(Utc::now());
                item.last_error = Some(format!("{:#}", e));
                return self.retry_or_exhaust(item, "lookup").await;
            }
        };

        let command = self.dispatch.command_for(&order);
        let action = command.action();
        let started = Instant::now();
        let outcome = command.execute().await;
        let elapsed = started.elapsed().as_secs_f64();

        item.last_attempt_at = Some(Utc::now());

        if outcome.success {
            self.metrics.record_command(action, "success", elapsed);
            return ItemOutcome::Succeeded;
        }

        let error = outcome
            .error
            .clone()
            .unwrap_or_else(|| "unspecified failure".to_string());

        if outcome.should_retry {
            self.metrics.record_command(action, "retry", elapsed);
            tracing::warn!(
                order_id = %order.id,
                action = action,
                retry_count = item.retry_count + 1,
                error = %error,
                "Transient command failure"
            );
            item.retry_count += 1;
            item.last_error = Some(error);
            return self.retry_or_exhaust(item, action).await;
        }

        self.metrics.record_command(action, "fatal", elapsed);
        tracing::error!(
            order_id = %order.id,
            action = action,
            error = %error,
            "Fatal command failure, abandoning order"
        );
        self.abandon(order.id).await;
        ItemOutcome::Abandoned
    }

    async fn retry_or_exhaust(&self, item: QueueItem, action: &str) -> ItemOutcome {
        if self.config.abandon_on_exhaustion && item.retry_count >= self.config.max_retries {
            tracing::error!(
                order_id = %item.order_id,
                retry_count = item.retry_count,
                max_retries = self.config.max_retries,
                last_error = %item.last_error.as_deref().unwrap_or(""),
                "💀 Retries exhausted, abandoning order"
            );
            self.abandon(item.order_id).await;
            return ItemOutcome::Abandoned;
        }

        self.metrics.record_retry(action);
        ItemOutcome::Retry(item)
    }

    async fn abandon(&self, order_id: Uuid) {
        self.metrics.record_abandoned();
        match self.store.update_status(order_id, OrderStatus::Abandoned).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!(order_id = %order_id, "Could not flag vanished order as abandoned");
            }
            Err(e) => {
                tracing::error!(
                    order_id = %order_id,
                    error = %format!("{:#}", e),
                    "Failed to flag order as abandoned"
                );
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
