// ============================================================================
// Fulfillment Pipeline
// ============================================================================
//
// The queue-driven state machine that advances purchase orders:
// - commands/     one action per actionable status + the dispatch table
// - queue         pending set with retry bookkeeping
// - processor     drain-and-process pass + retry exhaustion policy
// - dispatcher    periodic loop actor
// - reorder       inventory monitor feeding new orders into the queue
// - delivery      delivery-intake path
// - health        component health actor
// - coordinator   supervisor wiring the actors together
//
// ============================================================================

pub mod commands;
pub mod coordinator;
pub mod delivery;
pub mod dispatcher;
pub mod health;
pub mod processor;
pub mod queue;
pub mod reorder;

pub use coordinator::CoordinatorActor;
pub use delivery::DeliveryIntake;
pub use dispatcher::DispatcherActor;
pub use processor::{PassSummary, PipelineProcessor};
pub use queue::{QueueItem, WorkQueue};
pub use reorder::{InventoryStatus, ReorderMonitor, ReorderReport};
