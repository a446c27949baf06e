//! SQLite-backed roster store shared by the per-kind repositories.

use super::{RepoError, RepoResult, TransactionalStore};
use crate::model::flags::{FlagKey, FlagMap};
use crate::model::identity::{EntityKind, OrganizationId};
use crate::model::membership::Membership;
use rusqlite::{Connection, Row};
use uuid::Uuid;

/// Roster store over one migrated connection.
///
/// One store instance is one execution context: transactions opened through
/// it are visible to other connections only after `commit`.
pub struct SqliteRosterStore<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> SqliteRosterStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        self.conn
    }

    /// Counts stored rows of one kind.
    pub fn count(&self, kind: EntityKind) -> RepoResult<u64> {
        let table = match kind {
            EntityKind::Organization => "organizations",
            EntityKind::Person => "persons",
            EntityKind::Membership => "memberships",
            EntityKind::Language => "languages",
            EntityKind::Keyword => "keywords",
            EntityKind::LocalizedKeyword => "localized_keywords",
        };
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count in {table}")))
    }

    /// Lists memberships of one club ordered by creation.
    pub fn memberships_of(&self, organization: OrganizationId) -> RepoResult<Vec<Membership>> {
        self.query_memberships("WHERE organization_uuid = ?1", [organization.to_string()])
    }

    pub(super) fn count_memberships_where(&self, column: &str, uuid: Uuid) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM memberships WHERE {column} = ?1;"),
            [uuid.to_string()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

impl TransactionalStore for SqliteRosterStore<'_> {
    fn begin(&self) -> RepoResult<()> {
        // Immediate: take the write lock up front so concurrent sessions
        // queue on the busy timeout instead of failing at first write.
        self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        Ok(())
    }

    fn commit(&self) -> RepoResult<()> {
        if self.conn.is_autocommit() {
            return Err(RepoError::NoTransaction);
        }
        self.conn.execute_batch("COMMIT;")?;
        Ok(())
    }

    fn rollback(&self) -> RepoResult<()> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.conn.execute_batch("ROLLBACK;")?;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

pub(super) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(super) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(super) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

/// Reads tri-state flag columns; NULL stays unspecified.
pub(super) fn read_flags<K: FlagKey>(row: &Row<'_>) -> RepoResult<FlagMap<K>> {
    let mut flags = FlagMap::new();
    for key in K::ALL {
        let column = key.column();
        if let Some(value) = row.get::<_, Option<i64>>(column)? {
            flags.set(*key, int_to_bool(value, column)?);
        }
    }
    Ok(flags)
}

pub(super) fn flag_value<K: FlagKey>(flags: &FlagMap<K>, key: K) -> Option<i64> {
    flags.get(key).map(bool_to_int)
}
