//! Membership entity linking one person to one club.

use super::flags::{RoleFlags, RolesAndStatus, StatusFlags};
use super::identity::{EntityKind, MembershipId, MembershipKey};
use super::{merge_optional, Reconcilable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub uuid: MembershipId,
    pub key: MembershipKey,
    pub roles: RoleFlags,
    pub status: StatusFlags,
    /// Portfolio page of this member on the club site.
    pub member_website: Option<String>,
    pub latest_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MembershipPatch {
    pub roles: RoleFlags,
    pub status: StatusFlags,
    pub member_website: Option<String>,
    pub latest_image: Option<String>,
}

impl MembershipPatch {
    pub fn from_roles_and_status(roles_and_status: &RolesAndStatus) -> Self {
        Self {
            roles: roles_and_status.roles.clone(),
            status: roles_and_status.status.clone(),
            ..Self::default()
        }
    }
}

impl Reconcilable for Membership {
    type Key = MembershipKey;
    type Patch = MembershipPatch;

    const KIND: EntityKind = EntityKind::Membership;

    fn create(key: &Self::Key) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            key: *key,
            roles: RoleFlags::new(),
            status: StatusFlags::new(),
            member_website: None,
            latest_image: None,
        }
    }

    fn key(&self) -> Self::Key {
        self.key
    }

    fn merge(&mut self, patch: &Self::Patch) -> bool {
        let mut modified = false;
        modified |= self.roles.merge_from(&patch.roles);
        modified |= self.status.merge_from(&patch.status);
        modified |= merge_optional(&mut self.member_website, patch.member_website.as_ref());
        modified |= merge_optional(&mut self.latest_image, patch.latest_image.as_ref());
        modified
    }
}
