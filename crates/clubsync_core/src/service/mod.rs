//! Session orchestration on top of the reconciliation engine.
//!
//! # Responsibility
//! - Run one ingestion per organization inside one transaction.
//! - Provide the hardcoded seed sets and the worker-thread runner.

pub mod report;
pub mod seed;
pub mod sync_session;
pub mod worker;

pub use report::{KindCounts, SessionMode, SessionOutcome, SessionReport};
pub use sync_session::{MemberRecord, OrganizationTarget, RosterStore, SyncSession};
