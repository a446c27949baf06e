//! Find-create-update reconciliation.
//!
//! # Responsibility
//! - Turn (identity key, proposed attributes) into an idempotent upsert.
//! - Report whether anything changed, and whether a write was rejected.
//!
//! # Invariants
//! - The engine never commits, except in eager-save mode.
//! - A rejected write is reported as `WriteFailed`, never as a modification.

mod engine;

pub use engine::{Outcome, Reconciled, ReconciliationEngine};
