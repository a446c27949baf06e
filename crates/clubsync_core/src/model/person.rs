//! Photographer entity.

use super::flags::{MemberStatus, RolesAndStatus};
use super::identity::{EntityKind, PersonId, PersonIdentity};
use super::{merge_field, merge_optional, Reconcilable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub uuid: PersonId,
    pub identity: PersonIdentity,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub born_on: Option<NaiveDate>,
    pub is_deceased: bool,
}

/// Proposed person attributes. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonPatch {
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub born_on: Option<NaiveDate>,
    pub is_deceased: Option<bool>,
}

impl PersonPatch {
    /// Copies the deceased status out of a roles/status proposal.
    ///
    /// Only the `deceased` key is meaningful for a person; an absent key
    /// stays unspecified.
    pub fn with_status(mut self, roles_and_status: &RolesAndStatus) -> Self {
        if let Some(deceased) = roles_and_status.status.get(MemberStatus::Deceased) {
            self.is_deceased = Some(deceased);
        }
        self
    }
}

impl Person {
    pub fn full_name(&self) -> String {
        self.identity.full_name()
    }
}

impl Reconcilable for Person {
    type Key = PersonIdentity;
    type Patch = PersonPatch;

    const KIND: EntityKind = EntityKind::Person;

    fn create(key: &Self::Key) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            identity: key.clone(),
            phone_number: None,
            email: None,
            website: None,
            born_on: None,
            is_deceased: false,
        }
    }

    fn key(&self) -> Self::Key {
        self.identity.clone()
    }

    fn merge(&mut self, patch: &Self::Patch) -> bool {
        let mut modified = false;
        modified |= merge_field(&mut self.is_deceased, patch.is_deceased.as_ref());
        modified |= merge_optional(&mut self.born_on, patch.born_on.as_ref());
        modified |= merge_optional(&mut self.phone_number, patch.phone_number.as_ref());
        modified |= merge_optional(&mut self.email, patch.email.as_ref());
        modified |= merge_optional(&mut self.website, patch.website.as_ref());
        modified
    }
}

#[cfg(test)]
mod tests {
    use super::{Person, PersonPatch};
    use crate::model::flags::{MemberStatus, RolesAndStatus, StatusFlags};
    use crate::model::identity::PersonIdentity;
    use crate::model::Reconcilable;

    #[test]
    fn with_status_copies_only_deceased_key() {
        let proposal = RolesAndStatus::status_only(
            StatusFlags::new()
                .with(MemberStatus::Former, true)
                .with(MemberStatus::Deceased, true),
        );
        let patch = PersonPatch::default().with_status(&proposal);
        assert_eq!(patch.is_deceased, Some(true));

        let silent = PersonPatch::default().with_status(&RolesAndStatus::default());
        assert_eq!(silent.is_deceased, None);
    }

    #[test]
    fn unspecified_deceased_does_not_revive() {
        let mut person = Person::create(&PersonIdentity::new("Jan", "Janssen"));
        person.is_deceased = true;
        let patch = PersonPatch {
            email: Some("jan@example.nl".to_string()),
            ..PersonPatch::default()
        };
        assert!(person.merge(&patch));
        assert!(person.is_deceased);
    }
}
