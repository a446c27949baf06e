//! Photo club entity.

use super::identity::{EntityKind, OrganizationId, OrganizationIdentity};
use super::{merge_field, merge_optional, Reconcilable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// WGS84 position of a club's meeting place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub uuid: OrganizationId,
    pub identity: OrganizationIdentity,
    /// Short display name, e.g. `FG Waalre`.
    pub nickname: String,
    pub website: Option<String>,
    /// Page the roster document is scraped from.
    pub member_list_url: Option<String>,
    /// National federation registration number.
    pub fotobond_number: Option<i64>,
    /// Chamber of commerce registration number.
    pub kvk_number: Option<i64>,
    pub coordinates: Option<Coordinates>,
    /// Lower values sort first in club lists.
    pub priority: i64,
    /// Set once hardcoded seed data was loaded for this club.
    pub has_hardcoded_member_data: bool,
}

/// Proposed organization attributes. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationPatch {
    pub nickname: Option<String>,
    pub website: Option<String>,
    pub member_list_url: Option<String>,
    pub fotobond_number: Option<i64>,
    pub kvk_number: Option<i64>,
    pub coordinates: Option<Coordinates>,
    pub priority: Option<i64>,
    pub has_hardcoded_member_data: Option<bool>,
}

impl Reconcilable for Organization {
    type Key = OrganizationIdentity;
    type Patch = OrganizationPatch;

    const KIND: EntityKind = EntityKind::Organization;

    fn create(key: &Self::Key) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            identity: key.clone(),
            nickname: String::new(),
            website: None,
            member_list_url: None,
            fotobond_number: None,
            kvk_number: None,
            coordinates: None,
            priority: 0,
            has_hardcoded_member_data: false,
        }
    }

    fn key(&self) -> Self::Key {
        self.identity.clone()
    }

    fn merge(&mut self, patch: &Self::Patch) -> bool {
        let mut modified = false;
        modified |= merge_field(&mut self.nickname, patch.nickname.as_ref());
        modified |= merge_optional(&mut self.website, patch.website.as_ref());
        modified |= merge_optional(&mut self.member_list_url, patch.member_list_url.as_ref());
        modified |= merge_optional(&mut self.fotobond_number, patch.fotobond_number.as_ref());
        modified |= merge_optional(&mut self.kvk_number, patch.kvk_number.as_ref());
        modified |= merge_optional(&mut self.coordinates, patch.coordinates.as_ref());
        modified |= merge_field(&mut self.priority, patch.priority.as_ref());
        modified |= merge_field(
            &mut self.has_hardcoded_member_data,
            patch.has_hardcoded_member_data.as_ref(),
        );
        modified
    }
}

#[cfg(test)]
mod tests {
    use super::{Coordinates, Organization, OrganizationPatch};
    use crate::model::identity::OrganizationIdentity;
    use crate::model::Reconcilable;

    #[test]
    fn merge_applies_only_supplied_attributes() {
        let mut club = Organization::create(&OrganizationIdentity::new("Fotogroep Waalre", "Waalre"));
        club.nickname = "FG Waalre".to_string();
        club.priority = 3;

        let patch = OrganizationPatch {
            coordinates: Some(Coordinates::new(51.39184, 5.46144)),
            ..OrganizationPatch::default()
        };
        assert!(club.merge(&patch));
        assert_eq!(club.nickname, "FG Waalre");
        assert_eq!(club.priority, 3);
        assert!(!club.merge(&patch));
    }
}
