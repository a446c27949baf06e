//! Partial role/status flag maps.
//!
//! # Invariants
//! - An absent key means "unspecified", never `false`.
//! - Merging a proposal only overwrites keys present in the proposal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A closed enumeration usable as a flag key.
pub trait FlagKey: Copy + Ord + Debug + 'static {
    /// Every key, in storage column order.
    const ALL: &'static [Self];

    /// Column holding this flag in the `memberships` table.
    fn column(self) -> &'static str;
}

/// Officer roles a member can hold within one club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Chairman,
    ViceChairman,
    Secretary,
    Treasurer,
    Admin,
}

impl FlagKey for MemberRole {
    const ALL: &'static [Self] = &[
        Self::Chairman,
        Self::ViceChairman,
        Self::Secretary,
        Self::Treasurer,
        Self::Admin,
    ];

    fn column(self) -> &'static str {
        match self {
            Self::Chairman => "role_chairman",
            Self::ViceChairman => "role_vice_chairman",
            Self::Secretary => "role_secretary",
            Self::Treasurer => "role_treasurer",
            Self::Admin => "role_admin",
        }
    }
}

/// Membership status signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Deceased,
    Former,
    Coach,
    Prospective,
}

impl FlagKey for MemberStatus {
    const ALL: &'static [Self] = &[
        Self::Deceased,
        Self::Former,
        Self::Coach,
        Self::Prospective,
    ];

    fn column(self) -> &'static str {
        match self {
            Self::Deceased => "status_deceased",
            Self::Former => "status_former",
            Self::Coach => "status_coach",
            Self::Prospective => "status_prospective",
        }
    }
}

/// Partial mapping from flag key to boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagMap<K: FlagKey>(BTreeMap<K, bool>);

impl<K: FlagKey> Default for FlagMap<K> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<K: FlagKey> FlagMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style assertion of one key.
    pub fn with(mut self, key: K, value: bool) -> Self {
        self.0.insert(key, value);
        self
    }

    pub fn set(&mut self, key: K, value: bool) {
        self.0.insert(key, value);
    }

    /// Returns the asserted value, or `None` when unspecified.
    pub fn get(&self, key: K) -> Option<bool> {
        self.0.get(&key).copied()
    }

    /// `true` only when the key is asserted as `true`.
    pub fn is_set(&self, key: K) -> bool {
        self.get(key).unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, bool)> + '_ {
        self.0.iter().map(|(key, value)| (*key, *value))
    }

    /// Key-wise merge of `proposal` into `self`.
    ///
    /// Returns `true` when any stored value was added or changed.
    pub fn merge_from(&mut self, proposal: &Self) -> bool {
        let mut changed = false;
        for (key, value) in proposal.iter() {
            if self.get(key) != Some(value) {
                self.0.insert(key, value);
                changed = true;
            }
        }
        changed
    }
}

impl<K: FlagKey> FromIterator<(K, bool)> for FlagMap<K> {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub type RoleFlags = FlagMap<MemberRole>;
pub type StatusFlags = FlagMap<MemberStatus>;

/// Roles and statuses proposed together, as hardcoded records carry them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolesAndStatus {
    #[serde(default)]
    pub roles: RoleFlags,
    #[serde(default)]
    pub status: StatusFlags,
}

impl RolesAndStatus {
    pub fn new(roles: RoleFlags, status: StatusFlags) -> Self {
        Self { roles, status }
    }

    pub fn status_only(status: StatusFlags) -> Self {
        Self {
            roles: RoleFlags::new(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MemberRole, MemberStatus, RoleFlags, StatusFlags};

    #[test]
    fn merge_keeps_keys_absent_from_proposal() {
        let mut stored = StatusFlags::new().with(MemberStatus::Former, true);
        let proposal = StatusFlags::new().with(MemberStatus::Coach, true);

        assert!(stored.merge_from(&proposal));
        assert_eq!(stored.get(MemberStatus::Former), Some(true));
        assert_eq!(stored.get(MemberStatus::Coach), Some(true));
        assert_eq!(stored.get(MemberStatus::Prospective), None);
    }

    #[test]
    fn merge_reports_no_change_for_identical_values() {
        let mut stored = RoleFlags::new().with(MemberRole::Chairman, true);
        let proposal = RoleFlags::new().with(MemberRole::Chairman, true);
        assert!(!stored.merge_from(&proposal));
    }

    #[test]
    fn explicit_false_overwrites_true() {
        let mut stored = StatusFlags::new().with(MemberStatus::Former, true);
        assert!(stored.merge_from(&StatusFlags::new().with(MemberStatus::Former, false)));
        assert_eq!(stored.get(MemberStatus::Former), Some(false));
        assert!(!stored.is_set(MemberStatus::Former));
    }

    #[test]
    fn flags_serialize_as_snake_case_map() {
        let flags = RoleFlags::new().with(MemberRole::ViceChairman, true);
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, r#"{"vice_chairman":true}"#);
    }
}
