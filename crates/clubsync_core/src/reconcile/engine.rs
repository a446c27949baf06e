//! Generic find-create-update over any [`Reconcilable`] entity kind.

use crate::config::EngineConfig;
use crate::model::Reconcilable;
use crate::repo::{EntityStore, RepoError, TransactionalStore};
use log::{debug, error, info, warn};

/// What a find-create-update call did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Unchanged,
    /// The store rejected the write; the returned entity is not trustworthy.
    WriteFailed,
}

/// Result of one find-create-update call.
#[derive(Debug, Clone)]
pub struct Reconciled<E> {
    pub entity: E,
    pub outcome: Outcome,
}

impl<E> Reconciled<E> {
    /// `true` for created or updated entities. A failed write is not a
    /// modification even if the in-memory entity was mutated.
    pub fn was_modified(&self) -> bool {
        matches!(self.outcome, Outcome::Created | Outcome::Updated)
    }

    pub fn write_failed(&self) -> bool {
        self.outcome == Outcome::WriteFailed
    }
}

/// Find-create-update engine bound to one store execution context.
pub struct ReconciliationEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: TransactionalStore> ReconciliationEngine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Looks up `key`, creates the entity if absent, and merges `patch`.
    ///
    /// Lookup failures are logged and treated as "no match", so the entity
    /// is created; the store's uniqueness constraint then rejects the insert
    /// if the row did exist.
    pub fn find_create_update<E>(&self, key: &E::Key, patch: &E::Patch) -> Reconciled<E>
    where
        E: Reconcilable,
        S: EntityStore<E>,
    {
        let kind = E::KIND;
        let mut matches = match EntityStore::<E>::lookup(&self.store, key) {
            Ok(found) => found,
            Err(err) => {
                error!(
                    "event=reconcile_lookup module=reconcile status=error kind={} key={:?} error={}",
                    kind, key, err
                );
                Vec::new()
            }
        };

        if matches.len() > 1 {
            warn!(
                "event=reconcile_lookup module=reconcile status=integrity_violation kind={} key={:?} matches={}",
                kind,
                key,
                matches.len()
            );
        }

        if !matches.is_empty() {
            let mut entity = matches.swap_remove(0);
            if !entity.merge(patch) {
                debug!(
                    "event=reconcile module=reconcile status=unchanged kind={} key={:?}",
                    kind, key
                );
                return Reconciled {
                    entity,
                    outcome: Outcome::Unchanged,
                };
            }

            let written = EntityStore::<E>::update(&self.store, &entity)
                .and_then(|()| self.save_if_eager());
            return match written {
                Ok(()) => {
                    info!(
                        "event=reconcile module=reconcile status=updated kind={} key={:?}",
                        kind, key
                    );
                    Reconciled {
                        entity,
                        outcome: Outcome::Updated,
                    }
                }
                Err(err) => self.write_failed(entity, "update", err),
            };
        }

        let mut entity = E::create(key);
        entity.merge(patch);
        let written =
            EntityStore::<E>::insert(&self.store, &entity).and_then(|()| self.save_if_eager());
        match written {
            Ok(()) => {
                info!(
                    "event=reconcile module=reconcile status=created kind={} key={:?}",
                    kind, key
                );
                Reconciled {
                    entity,
                    outcome: Outcome::Created,
                }
            }
            Err(err) => self.write_failed(entity, "insert", err),
        }
    }

    fn write_failed<E: Reconcilable>(
        &self,
        entity: E,
        operation: &str,
        err: RepoError,
    ) -> Reconciled<E> {
        error!(
            "event=reconcile module=reconcile status=write_failed kind={} operation={} key={:?} error={}",
            E::KIND,
            operation,
            entity.key(),
            err
        );
        Reconciled {
            entity,
            outcome: Outcome::WriteFailed,
        }
    }

    /// Commits and reopens the enclosing transaction in eager-save mode.
    ///
    /// Only a failed commit is an error. Once the commit went through the
    /// write is durable, so a failed reopen is logged and later writes run
    /// outside a transaction.
    fn save_if_eager(&self) -> Result<(), RepoError> {
        if !self.config.eager_save || !self.store.in_transaction() {
            return Ok(());
        }
        self.store.commit()?;
        match self.store.begin() {
            Ok(()) => debug!("event=eager_save module=reconcile status=ok"),
            Err(err) => warn!(
                "event=eager_save module=reconcile status=reopen_failed error={}",
                err
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Outcome, ReconciliationEngine};
    use crate::config::EngineConfig;
    use crate::model::identity::PersonIdentity;
    use crate::model::person::{Person, PersonPatch};
    use crate::model::Reconcilable;
    use crate::repo::{EntityStore, RepoError, RepoResult, TransactionalStore};
    use std::cell::{Cell, RefCell};

    /// In-memory store without a uniqueness constraint, so duplicate and
    /// failing-write paths can be exercised.
    #[derive(Default)]
    struct MemoryStore {
        persons: RefCell<Vec<Person>>,
        fail_writes: Cell<bool>,
        fail_begin: Cell<bool>,
        in_tx: Cell<bool>,
        commits: Cell<u32>,
    }

    fn rejected() -> RepoError {
        RepoError::InvalidData("disk full".to_string())
    }

    impl EntityStore<Person> for &MemoryStore {
        fn lookup(&self, key: &PersonIdentity) -> RepoResult<Vec<Person>> {
            Ok(self
                .persons
                .borrow()
                .iter()
                .filter(|person| &person.identity == key)
                .cloned()
                .collect())
        }

        fn insert(&self, person: &Person) -> RepoResult<()> {
            if self.fail_writes.get() {
                return Err(rejected());
            }
            self.persons.borrow_mut().push(person.clone());
            Ok(())
        }

        fn update(&self, person: &Person) -> RepoResult<()> {
            if self.fail_writes.get() {
                return Err(rejected());
            }
            let mut persons = self.persons.borrow_mut();
            if let Some(slot) = persons.iter_mut().find(|stored| stored.uuid == person.uuid) {
                *slot = person.clone();
            }
            Ok(())
        }

        fn delete(&self, person: &Person) -> RepoResult<()> {
            self.persons
                .borrow_mut()
                .retain(|stored| stored.uuid != person.uuid);
            Ok(())
        }
    }

    impl TransactionalStore for &MemoryStore {
        fn begin(&self) -> RepoResult<()> {
            if self.fail_begin.get() {
                return Err(RepoError::InvalidData("database is locked".to_string()));
            }
            self.in_tx.set(true);
            Ok(())
        }

        fn commit(&self) -> RepoResult<()> {
            if self.fail_writes.get() {
                return Err(rejected());
            }
            self.commits.set(self.commits.get() + 1);
            Ok(())
        }

        fn rollback(&self) -> RepoResult<()> {
            self.in_tx.set(false);
            Ok(())
        }

        fn in_transaction(&self) -> bool {
            self.in_tx.get()
        }
    }

    fn jan() -> PersonIdentity {
        PersonIdentity::new("Jan", "Janssen")
    }

    fn phone(value: &str) -> PersonPatch {
        PersonPatch {
            phone_number: Some(value.to_string()),
            ..PersonPatch::default()
        }
    }

    #[test]
    fn create_then_identical_call_is_unchanged() {
        let store = MemoryStore::default();
        let engine = ReconciliationEngine::new(&store, EngineConfig::default());

        let first = engine.find_create_update::<Person>(&jan(), &phone("040-123"));
        assert_eq!(first.outcome, Outcome::Created);
        assert!(first.was_modified());

        let second = engine.find_create_update::<Person>(&jan(), &phone("040-123"));
        assert_eq!(second.outcome, Outcome::Unchanged);
        assert!(!second.was_modified());
        assert_eq!(second.entity.uuid, first.entity.uuid);
        assert_eq!(store.persons.borrow().len(), 1);
    }

    #[test]
    fn empty_patch_still_creates() {
        let store = MemoryStore::default();
        let engine = ReconciliationEngine::new(&store, EngineConfig::default());

        let created = engine.find_create_update::<Person>(&jan(), &PersonPatch::default());
        assert_eq!(created.outcome, Outcome::Created);
        assert_eq!(created.entity.identity, jan());
    }

    #[test]
    fn duplicate_matches_use_first_row() {
        let store = MemoryStore::default();
        let first = Person::create(&jan());
        let second = Person::create(&jan());
        store.persons.borrow_mut().push(first.clone());
        store.persons.borrow_mut().push(second);
        let engine = ReconciliationEngine::new(&store, EngineConfig::default());

        let result = engine.find_create_update::<Person>(&jan(), &phone("06-1"));
        assert_eq!(result.outcome, Outcome::Updated);
        assert_eq!(result.entity.uuid, first.uuid);
        assert_eq!(store.persons.borrow().len(), 2);
    }

    #[test]
    fn rejected_write_is_not_a_modification() {
        let store = MemoryStore::default();
        let engine = ReconciliationEngine::new(&store, EngineConfig::default());
        engine.find_create_update::<Person>(&jan(), &phone("040-123"));

        store.fail_writes.set(true);
        let result = engine.find_create_update::<Person>(&jan(), &phone("040-999"));
        assert_eq!(result.outcome, Outcome::WriteFailed);
        assert!(!result.was_modified());
        assert!(result.write_failed());
        assert_eq!(
            store.persons.borrow()[0].phone_number.as_deref(),
            Some("040-123")
        );
    }

    #[test]
    fn eager_save_commits_only_inside_transaction() {
        let store = MemoryStore::default();
        let engine = ReconciliationEngine::new(&store, EngineConfig { eager_save: true });

        engine.find_create_update::<Person>(&jan(), &phone("1"));
        assert_eq!(store.commits.get(), 0);

        engine.store().begin().unwrap();
        engine.find_create_update::<Person>(&jan(), &phone("2"));
        engine.find_create_update::<Person>(&jan(), &phone("2"));
        assert_eq!(store.commits.get(), 1);
    }

    #[test]
    fn eager_save_reopen_failure_keeps_committed_write() {
        let store = MemoryStore::default();
        let engine = ReconciliationEngine::new(&store, EngineConfig { eager_save: true });
        engine.store().begin().unwrap();

        store.fail_begin.set(true);
        let created = engine.find_create_update::<Person>(&jan(), &phone("1"));
        assert_eq!(created.outcome, Outcome::Created);
        assert!(created.was_modified());
        assert_eq!(store.commits.get(), 1);
        assert_eq!(store.persons.borrow().len(), 1);
    }

    #[test]
    fn default_mode_never_commits() {
        let store = MemoryStore::default();
        let engine = ReconciliationEngine::new(&store, EngineConfig::default());
        engine.store().begin().unwrap();
        engine.find_create_update::<Person>(&jan(), &phone("1"));
        engine.find_create_update::<Person>(&jan(), &phone("2"));
        assert_eq!(store.commits.get(), 0);
    }
}
