// ============================================================================
// Domain Module
// ============================================================================
//
// Business types for the procurement pipeline. Everything here is plain
// data + invariants; side effects live in `pipeline` and `collaborators`.
//
// ============================================================================

pub mod purchase_order;

pub use purchase_order::*;
