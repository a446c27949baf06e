use chrono::NaiveDate;
use clubsync_core::config::SyncConfig;
use clubsync_core::model::flags::{MemberRole, MemberStatus};
use clubsync_core::model::identity::{OrganizationIdentity, PersonIdentity};
use clubsync_core::model::organization::{Coordinates, Organization};
use clubsync_core::model::person::Person;
use clubsync_core::service::seed::{load_seed_set, seed_set, seed_sets};
use clubsync_core::service::{SessionMode, SessionOutcome, SyncSession};
use clubsync_core::{open_db_in_memory, EntityKind, EntityStore, SqliteRosterStore};
use rusqlite::Connection;

fn club(conn: &Connection, full_name: &str, town: &str) -> Organization {
    let store = SqliteRosterStore::new(conn);
    let mut found = EntityStore::<Organization>::lookup(
        &store,
        &OrganizationIdentity::new(full_name, town),
    )
    .unwrap();
    assert_eq!(found.len(), 1);
    found.remove(0)
}

fn reject_membership_inserts(conn: &Connection) {
    conn.execute_batch(
        "CREATE TRIGGER reject_memberships BEFORE INSERT ON memberships
         BEGIN SELECT RAISE(ABORT, 'memberships are read-only'); END;",
    )
    .unwrap();
}

#[test]
fn every_seed_set_loads_successfully() {
    let conn = open_db_in_memory().unwrap();
    let config = SyncConfig::default();
    for set in seed_sets() {
        let report = load_seed_set(SqliteRosterStore::new(&conn), &config, &set);
        assert_eq!(report.outcome, SessionOutcome::Success, "{}: {:?}", set.key, report.warnings);
        assert_eq!(report.mode, SessionMode::Seed);
        assert!(report.committed);
    }

    let store = SqliteRosterStore::new(&conn);
    assert_eq!(store.count(EntityKind::Organization).unwrap(), 5);
    // Peter is one person with a membership in each test club.
    assert_eq!(store.count(EntityKind::Person).unwrap(), 2);
    assert_eq!(store.count(EntityKind::Membership).unwrap(), 4);
}

#[test]
fn test_amsterdam_carries_its_attributes() {
    let conn = open_db_in_memory().unwrap();
    let set = seed_set("test_amsterdam").unwrap();
    load_seed_set(SqliteRosterStore::new(&conn), &SyncConfig::default(), &set);

    let amsterdam = club(&conn, "Test Fotoclub", "Amsterdam");
    assert_eq!(amsterdam.nickname, "FC Test Adam");
    assert_eq!(amsterdam.coordinates, Some(Coordinates::new(52.364217, 4.893370)));
    assert_eq!(amsterdam.priority, 1);
    assert!(amsterdam.has_hardcoded_member_data);

    let store = SqliteRosterStore::new(&conn);
    let peter = EntityStore::<Person>::lookup(&store, &PersonIdentity::new("Peter", "van den Hamer"))
        .unwrap()
        .remove(0);
    assert_eq!(peter.email.as_deref(), Some("foobarA@vdhamer.com"));

    let memberships = store.memberships_of(amsterdam.uuid).unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].roles.get(MemberRole::Secretary), Some(true));
    assert_eq!(memberships[0].status.get(MemberStatus::Former), Some(false));
    assert_eq!(memberships[0].roles.get(MemberRole::Chairman), None);
}

#[test]
fn de_gender_member_has_birth_date_and_website() {
    let conn = open_db_in_memory().unwrap();
    let set = seed_set("fotogroep_de_gender").unwrap();
    load_seed_set(SqliteRosterStore::new(&conn), &SyncConfig::default(), &set);

    let de_gender = club(&conn, "Fotogroep de Gender", "Eindhoven");
    assert_eq!(de_gender.fotobond_number, Some(1620));

    let store = SqliteRosterStore::new(&conn);
    let mariet = EntityStore::<Person>::lookup(&store, &PersonIdentity::new("Mariet", "Wielders"))
        .unwrap()
        .remove(0);
    assert_eq!(mariet.born_on, NaiveDate::from_ymd_opt(1954, 10, 9));
    assert_eq!(mariet.website.as_deref(), Some("https://www.m3w.nl"));
    assert!(!mariet.is_deceased);
}

#[test]
fn reloading_seed_data_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let config = SyncConfig::default();
    for set in seed_sets() {
        load_seed_set(SqliteRosterStore::new(&conn), &config, &set);
    }
    for set in seed_sets() {
        let report = load_seed_set(SqliteRosterStore::new(&conn), &config, &set);
        assert_eq!(report.organizations.unchanged, 1, "{}", set.key);
        assert_eq!(report.persons.modified(), 0, "{}", set.key);
        assert_eq!(report.memberships.modified(), 0, "{}", set.key);
    }
}

#[test]
fn failed_write_is_fatal_for_a_seed_session() {
    let conn = open_db_in_memory().unwrap();
    reject_membership_inserts(&conn);
    let set = seed_set("test_rotterdam").unwrap();

    let report = load_seed_set(SqliteRosterStore::new(&conn), &SyncConfig::default(), &set);
    assert_eq!(report.outcome, SessionOutcome::Fatal);
    assert!(!report.committed);
    assert_eq!(report.memberships.failed, 1);

    let store = SqliteRosterStore::new(&conn);
    assert_eq!(store.count(EntityKind::Organization).unwrap(), 0);
    assert_eq!(store.count(EntityKind::Person).unwrap(), 0);
}

#[test]
fn failed_write_only_warns_in_a_live_session() {
    let conn = open_db_in_memory().unwrap();
    reject_membership_inserts(&conn);
    let set = seed_set("test_rotterdam").unwrap();

    let report = SyncSession::new(SqliteRosterStore::new(&conn), SyncConfig::default())
        .sync_records(&set.target, &set.members);
    assert_eq!(report.outcome, SessionOutcome::SuccessWithWarnings);
    assert!(report.committed);
    assert_eq!(report.memberships.failed, 1);

    let store = SqliteRosterStore::new(&conn);
    assert_eq!(store.count(EntityKind::Organization).unwrap(), 1);
    assert_eq!(store.count(EntityKind::Person).unwrap(), 1);
    assert_eq!(store.count(EntityKind::Membership).unwrap(), 0);
}
