//! Photo-club roster ingestion core.
//!
//! Parses member roster pages, reconciles clubs, photographers and
//! memberships into SQLite without duplicates, and reports per session.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod roster;
pub mod service;

pub use config::{ConfigError, EngineConfig, SyncConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{
    default_log_level, init_logging, logging_status, LoggingConfig, LoggingError, LoggingStatus,
};
pub use model::EntityKind;
pub use reconcile::{Outcome, Reconciled, ReconciliationEngine};
pub use repo::{EntityStore, RepoError, RepoResult, SqliteRosterStore, TransactionalStore};
pub use roster::parser::{ParseState, RosterAnchors};
pub use service::{SessionOutcome, SessionReport, SyncSession};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
