//! Natural identity keys.
//!
//! Identity keys are compared by exact equality: no trimming, no case
//! folding. Two different real people with the same given and family name
//! map to the same `PersonIdentity`; that collision is accepted.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type OrganizationId = Uuid;
pub type PersonId = Uuid;
pub type MembershipId = Uuid;

/// Closed set of entity kinds handled by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Organization,
    Person,
    Membership,
    Language,
    Keyword,
    LocalizedKeyword,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        Self::Organization,
        Self::Person,
        Self::Membership,
        Self::Language,
        Self::Keyword,
        Self::LocalizedKeyword,
    ];

    /// Stable snake_case name used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Person => "person",
            Self::Membership => "membership",
            Self::Language => "language",
            Self::Keyword => "keyword",
            Self::LocalizedKeyword => "localized_keyword",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Natural key of a photo club.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationIdentity {
    pub full_name: String,
    pub town: String,
}

impl OrganizationIdentity {
    pub fn new(full_name: impl Into<String>, town: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            town: town.into(),
        }
    }
}

impl Display for OrganizationIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.full_name, self.town)
    }
}

/// Natural key of a photographer.
///
/// `family_name` includes any lowercase particle ("van den Hamer").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonIdentity {
    pub given_name: String,
    pub family_name: String,
}

impl PersonIdentity {
    pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            given_name: given_name.into(),
            family_name: family_name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        if self.family_name.is_empty() {
            self.given_name.clone()
        } else {
            format!("{} {}", self.given_name, self.family_name)
        }
    }
}

impl Display for PersonIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Natural key of a membership: one person in one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipKey {
    pub organization: OrganizationId,
    pub person: PersonId,
}

impl Display for MembershipKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.person, self.organization)
    }
}
