use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

// ============================================================================
// Work Queue
// ============================================================================
//
// The process-wide pending set of purchase-order identifiers awaiting
// processing. Behaves as a set keyed by order id (a duplicate enqueue is a
// no-op) while preserving enqueue order for fairness. All mutation goes
// through one async mutex so enqueue, drain and count never observe a torn
// state; serializing the processing itself is the processor's job.
//
// ============================================================================

/// Transient bookkeeping for one queued order.
#[derive(Debug, Clone, Serialize)]
pub struct QueueItem {
    pub order_id: Uuid,
    pub enqueued_at: DateTime<Utc>,
    pub retry_count: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl QueueItem {
    fn new(order_id: Uuid) -> Self {
        Self {
            order_id,
            enqueued_at: Utc::now(),
            retry_count: 0,
            last_attempt_at: None,
            last_error: None,
        }
    }
}

#[derive(Default)]
struct PendingSet {
    order: VecDeque<Uuid>,
    items: HashMap<Uuid, QueueItem>,
}

#[derive(Default)]
pub struct WorkQueue {
    pending: Mutex<PendingSet>,
}

impl WorkQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add an order to the pending set. Returns false when it was already
    /// queued; a duplicate never causes double processing.
    pub async fn enqueue(&self, order_id: Uuid) -> bool {
        let mut pending = self.pending.lock().await;
        if pending.items.contains_key(&order_id) {
            tracing::debug!(order_id = %order_id, "Order already queued, skipping");
            return false;
        }
        pending.order.push_back(order_id);
        pending.items.insert(order_id, QueueItem::new(order_id));
        tracing::debug!(order_id = %order_id, depth = pending.items.len(), "Order queued");
        true
    }

    /// Atomically take everything currently pending, in enqueue order.
    /// Orders enqueued after this call land in the next pass.
    pub async fn drain_snapshot(&self) -> Vec<QueueItem> {
        let mut pending = self.pending.lock().await;
        let ids: Vec<Uuid> = pending.order.drain(..).collect();
        ids.into_iter()
            .filter_map(|id| pending.items.remove(&id))
            .collect()
    }

    /// Put a retried item back for the next pass. If the id was re-enqueued
    /// while the pass ran, bookkeeping merges instead of resetting: the
    /// retry count keeps its maximum and the latest error wins.
    pub async fn requeue(&self, item: QueueItem) {
        let mut pending = self.pending.lock().await;
        match pending.items.get_mut(&item.order_id) {
            Some(existing) => {
                existing.retry_count = existing.retry_count.max(item.retry_count);
                existing.last_attempt_at = item.last_attempt_at;
                existing.last_error = item.last_error;
            }
            None => {
                pending.order.push_back(item.order_id);
                pending.items.insert(item.order_id, item);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.items.is_empty()
    }

    /// Read-only view for the introspection endpoint, in enqueue order.
    pub async fn snapshot_items(&self) -> Vec<QueueItem> {
        let pending = self.pending.lock().await;
        pending
            .order
            .iter()
            .filter_map(|id| pending.items.get(id).cloned())
            .collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_enqueue_is_suppressed() {
        let queue = WorkQueue::new();
        let id = Uuid::new_v4();

        assert!(queue.enqueue(id).await);
        assert!(!queue.enqueue(id).await);
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_drain_preserves_enqueue_order_and_empties_queue() {
        let queue = WorkQueue::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        queue.enqueue(first).await;
        queue.enqueue(second).await;

        let drained = queue.drain_snapshot().await;

        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].order_id, first);
        assert_eq!(drained[1].order_id, second);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_enqueue_after_drain_lands_in_next_snapshot() {
        let queue = WorkQueue::new();
        let first = Uuid::new_v4();
        queue.enqueue(first).await;

        let pass_one = queue.drain_snapshot().await;
        assert_eq!(pass_one.len(), 1);

        // Arrives "mid-pass"
        let second = Uuid::new_v4();
        queue.enqueue(second).await;

        let pass_two = queue.drain_snapshot().await;
        assert_eq!(pass_two.len(), 1);
        assert_eq!(pass_two[0].order_id, second);
    }

    #[tokio::test]
    async fn test_requeue_keeps_bookkeeping() {
        let queue = WorkQueue::new();
        let id = Uuid::new_v4();
        queue.enqueue(id).await;

        let mut item = queue.drain_snapshot().await.remove(0);
        item.retry_count += 1;
        item.last_error = Some("timeout".to_string());
        item.last_attempt_at = Some(Utc::now());
        queue.requeue(item).await;

        let items = queue.snapshot_items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].retry_count, 1);
        assert_eq!(items[0].last_error.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn test_requeue_merges_with_concurrent_enqueue() {
        let queue = WorkQueue::new();
        let id = Uuid::new_v4();
        queue.enqueue(id).await;

        let mut item = queue.drain_snapshot().await.remove(0);
        item.retry_count = 2;
        item.last_error = Some("boom".to_string());

        // Someone re-enqueues the same order while the pass is running
        queue.enqueue(id).await;
        queue.requeue(item).await;

        // One entry, retry bookkeeping not reset by the fresh enqueue
        let items = queue.snapshot_items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].retry_count, 2);
        assert_eq!(items[0].last_error.as_deref(), Some("boom"));
    }
}
