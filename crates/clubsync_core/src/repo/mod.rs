//! Store contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the lookup/insert/update/delete contract the reconciliation
//!   engine is written against.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `lookup` compares identity fields by exact equality.
//! - Transactions are explicit: callers decide when to commit.
//! - Read paths reject invalid persisted state instead of masking it.

mod keyword_repo;
mod membership_repo;
mod organization_repo;
mod person_repo;
mod sqlite_store;

pub use sqlite_store::SqliteRosterStore;

use crate::db::DbError;
use crate::model::identity::EntityKind;
use crate::model::Reconcilable;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for roster persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Target row does not exist.
    NotFound { kind: EntityKind, key: String },
    /// Delete refused while dependent rows still reference the target.
    HasDependents {
        kind: EntityKind,
        key: String,
        dependents: u64,
    },
    /// `commit` was called without an open transaction.
    NoTransaction,
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, key } => write!(f, "{kind} not found: {key}"),
            Self::HasDependents {
                kind,
                key,
                dependents,
            } => write!(
                f,
                "cannot delete {kind} {key}: {dependents} dependent membership(s) remain"
            ),
            Self::NoTransaction => write!(f, "no open transaction to commit"),
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Per-kind persistence contract.
pub trait EntityStore<E: Reconcilable> {
    /// Returns every stored entity whose identity equals `key`.
    ///
    /// More than one row indicates a broken uniqueness constraint.
    fn lookup(&self, key: &E::Key) -> RepoResult<Vec<E>>;
    /// Inserts a new entity, identity and attributes included.
    fn insert(&self, entity: &E) -> RepoResult<()>;
    /// Persists all mutable attributes of an existing entity.
    fn update(&self, entity: &E) -> RepoResult<()>;
    /// Deletes one entity, cascading or refusing per kind.
    fn delete(&self, entity: &E) -> RepoResult<()>;
}

/// Explicit transaction boundaries on one execution context.
pub trait TransactionalStore {
    fn begin(&self) -> RepoResult<()>;
    fn commit(&self) -> RepoResult<()>;
    /// Discards uncommitted changes. A no-op without an open transaction.
    fn rollback(&self) -> RepoResult<()>;
    fn in_transaction(&self) -> bool;
}
