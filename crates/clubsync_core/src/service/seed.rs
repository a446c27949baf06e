//! Hardcoded seed data for clubs without a scrapeable roster.
//!
//! # Responsibility
//! - Describe each seed set as plain values.
//! - Load a set through a seed-mode [`SyncSession`].
//!
//! # Invariants
//! - Every set marks its organization `has_hardcoded_member_data`.
//! - Loading a set twice leaves the store unchanged the second time.

use crate::config::SyncConfig;
use crate::model::flags::{MemberRole, MemberStatus, RoleFlags, RolesAndStatus, StatusFlags};
use crate::model::identity::{OrganizationIdentity, PersonIdentity};
use crate::model::organization::{Coordinates, OrganizationPatch};
use crate::model::person::PersonPatch;
use crate::service::report::{SessionMode, SessionReport};
use crate::service::sync_session::{MemberRecord, OrganizationTarget, RosterStore, SyncSession};
use chrono::NaiveDate;
use log::info;

/// Bumped whenever a seed set below changes.
pub const SEED_DATA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct SeedSet {
    /// Stable short name, e.g. `test_amsterdam`.
    pub key: &'static str,
    pub target: OrganizationTarget,
    pub members: Vec<MemberRecord>,
}

/// All seed sets in load order.
pub fn seed_sets() -> Vec<SeedSet> {
    vec![
        fotogroep_waalre(),
        test_amsterdam(),
        test_den_haag(),
        test_rotterdam(),
        fotogroep_de_gender(),
    ]
}

pub fn seed_set(key: &str) -> Option<SeedSet> {
    seed_sets().into_iter().find(|set| set.key == key)
}

/// Loads one set in its own seed-mode session.
pub fn load_seed_set<S: RosterStore>(store: S, config: &SyncConfig, set: &SeedSet) -> SessionReport {
    info!(
        "event=seed_load module=service status=start set={} version={}",
        set.key, SEED_DATA_VERSION
    );
    SyncSession::new(store, config.clone())
        .with_mode(SessionMode::Seed)
        .sync_records(&set.target, &set.members)
}

fn club(nickname: &str, website: &str, coordinates: Coordinates) -> OrganizationPatch {
    OrganizationPatch {
        nickname: Some(nickname.to_string()),
        website: Some(website.to_string()),
        coordinates: Some(coordinates),
        has_hardcoded_member_data: Some(true),
        ..OrganizationPatch::default()
    }
}

fn current(role: MemberRole) -> RolesAndStatus {
    RolesAndStatus::new(
        RoleFlags::new().with(role, true),
        StatusFlags::new().with(MemberStatus::Former, false),
    )
}

/// Peter is one person across all test clubs; only one set carries his email.
fn peter_van_den_hamer(
    role: MemberRole,
    suffix: &str,
    image: &str,
    email: Option<&str>,
) -> MemberRecord {
    let portfolio = format!("https://www.fotogroepwaalre.nl/fotos/Peter_van_den_Hamer{suffix}");
    MemberRecord {
        person_patch: PersonPatch {
            email: email.map(str::to_string),
            ..PersonPatch::default()
        },
        roles_and_status: current(role),
        latest_image: Some(format!("{portfolio}/{image}")),
        member_website: Some(portfolio),
        ..MemberRecord::new(PersonIdentity::new("Peter", "van den Hamer"))
    }
}

fn fotogroep_waalre() -> SeedSet {
    let identity = OrganizationIdentity::new("Fotogroep Waalre", "Waalre");
    let patch = club(
        "FG Waalre",
        "https://www.fotogroepwaalre.nl",
        Coordinates::new(51.39184, 5.46144),
    );
    SeedSet {
        key: "fotogroep_waalre",
        target: OrganizationTarget::new(identity).with_patch(OrganizationPatch {
            member_list_url: Some("https://www.fotogroepwaalre.nl/leden".to_string()),
            priority: Some(1),
            ..patch
        }),
        members: Vec::new(),
    }
}

fn test_amsterdam() -> SeedSet {
    let identity = OrganizationIdentity::new("Test Fotoclub", "Amsterdam");
    let patch = club(
        "FC Test Adam",
        "https://www.foam.org",
        Coordinates::new(52.364217, 4.893370),
    );
    SeedSet {
        key: "test_amsterdam",
        target: OrganizationTarget::new(identity).with_patch(OrganizationPatch {
            priority: Some(1),
            ..patch
        }),
        members: vec![peter_van_den_hamer(
            MemberRole::Secretary,
            "_testA",
            "thumbs/2022_Iceland_R5_013.jpg",
            Some("foobarA@vdhamer.com"),
        )],
    }
}

fn test_den_haag() -> SeedSet {
    let identity = OrganizationIdentity::new("Test Fotoclub", "Den Haag");
    let patch = club(
        "FC Test DenHaag",
        "https://www.km21.nl",
        Coordinates::new(52.090556, 4.279722),
    );
    SeedSet {
        key: "test_den_haag",
        target: OrganizationTarget::new(identity).with_patch(OrganizationPatch {
            priority: Some(1),
            ..patch
        }),
        members: vec![peter_van_den_hamer(
            MemberRole::ViceChairman,
            "_testDH",
            "thumbs/2010_Barcelona_95.jpg",
            None,
        )],
    }
}

fn test_rotterdam() -> SeedSet {
    let identity = OrganizationIdentity::new("Test Fotoclub", "Rotterdam");
    let patch = club(
        "FC Test",
        "https://www.nederlandsfotomuseum.nl",
        Coordinates::new(51.905292, 4.486934),
    );
    SeedSet {
        key: "test_rotterdam",
        target: OrganizationTarget::new(identity).with_patch(OrganizationPatch {
            fotobond_number: Some(1234),
            priority: Some(1),
            ..patch
        }),
        members: vec![peter_van_den_hamer(
            MemberRole::Admin,
            "_test",
            "images/2015_Madeira_RX1r_064.jpg",
            None,
        )],
    }
}

fn fotogroep_de_gender() -> SeedSet {
    let identity = OrganizationIdentity::new("Fotogroep de Gender", "Eindhoven");
    let patch = club(
        "de Gender",
        "https://www.fcdegender.nl",
        Coordinates::new(51.42398, 5.45010),
    );
    let exposition = "https://www.fcdegender.nl/wp-content/uploads/Expositie%202023/Mariet";
    SeedSet {
        key: "fotogroep_de_gender",
        target: OrganizationTarget::new(identity).with_patch(OrganizationPatch {
            fotobond_number: Some(1620),
            ..patch
        }),
        members: vec![MemberRecord {
            person_patch: PersonPatch {
                website: Some("https://www.m3w.nl".to_string()),
                born_on: NaiveDate::from_ymd_opt(1954, 10, 9),
                ..PersonPatch::default()
            },
            member_website: Some(format!("{exposition}/")),
            latest_image: Some(format!("{exposition}/slides/Mariet%203.jpg")),
            ..MemberRecord::new(PersonIdentity::new("Mariet", "Wielders"))
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::{seed_set, seed_sets};
    use std::collections::HashSet;

    #[test]
    fn seed_keys_are_unique_and_every_club_is_flagged() {
        let sets = seed_sets();
        let keys: HashSet<&str> = sets.iter().map(|set| set.key).collect();
        assert_eq!(keys.len(), sets.len());
        assert!(sets
            .iter()
            .all(|set| set.target.patch.has_hardcoded_member_data == Some(true)));
    }

    #[test]
    fn test_clubs_share_a_name_but_not_a_town() {
        let towns: HashSet<String> = seed_sets()
            .into_iter()
            .filter(|set| set.target.identity.full_name == "Test Fotoclub")
            .map(|set| set.target.identity.town)
            .collect();
        assert_eq!(towns.len(), 3);
    }

    #[test]
    fn unknown_key_is_none() {
        assert!(seed_set("nope").is_none());
        assert!(seed_set("test_rotterdam").is_some());
    }
}
