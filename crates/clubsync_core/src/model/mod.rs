//! Roster domain model.
//!
//! # Responsibility
//! - Define identity keys, entities and their attribute patches.
//! - Own the merge rules applied by find-create-update.
//!
//! # Invariants
//! - Identity fields are immutable once an entity exists.
//! - Patches only carry attributes the caller has evidence for; `None` and
//!   absent flag keys never clear stored values.

pub mod flags;
pub mod identity;
pub mod keyword;
pub mod membership;
pub mod organization;
pub mod person;

use std::fmt::Debug;

pub use identity::EntityKind;

/// An entity that can be looked up by natural key and merged with a patch.
///
/// Implemented once per entity kind, so every attribute a caller can propose
/// is checked at compile time.
pub trait Reconcilable: Clone + Debug {
    /// Natural identity fields. Compared by exact equality.
    type Key: Clone + Debug + PartialEq;
    /// Partial set of mutable attributes.
    type Patch: Debug;

    const KIND: EntityKind;

    /// Builds a fresh entity carrying only its identity and default attributes.
    fn create(key: &Self::Key) -> Self;

    /// Returns the identity of this entity.
    fn key(&self) -> Self::Key;

    /// Applies every supplied attribute that differs from the current value.
    ///
    /// Returns `true` when at least one attribute changed.
    fn merge(&mut self, patch: &Self::Patch) -> bool;
}

/// Overwrites `current` when `proposed` is supplied and different.
pub(crate) fn merge_field<T: PartialEq + Clone>(current: &mut T, proposed: Option<&T>) -> bool {
    match proposed {
        Some(value) if current != value => {
            *current = value.clone();
            true
        }
        _ => false,
    }
}

/// Same as [`merge_field`] for optional stored attributes.
pub(crate) fn merge_optional<T: PartialEq + Clone>(
    current: &mut Option<T>,
    proposed: Option<&T>,
) -> bool {
    match proposed {
        Some(value) if current.as_ref() != Some(value) => {
            *current = Some(value.clone());
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{merge_field, merge_optional};

    #[test]
    fn merge_field_ignores_missing_and_equal_values() {
        let mut value = 3;
        assert!(!merge_field(&mut value, None));
        assert!(!merge_field(&mut value, Some(&3)));
        assert!(merge_field(&mut value, Some(&4)));
        assert_eq!(value, 4);
    }

    #[test]
    fn merge_optional_never_clears() {
        let mut value = Some("a".to_string());
        assert!(!merge_optional(&mut value, None));
        assert_eq!(value.as_deref(), Some("a"));
        assert!(merge_optional(&mut value, Some(&"b".to_string())));
        assert_eq!(value.as_deref(), Some("b"));
    }
}
