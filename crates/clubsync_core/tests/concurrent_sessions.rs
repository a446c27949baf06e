use clubsync_core::config::SyncConfig;
use clubsync_core::model::identity::OrganizationIdentity;
use clubsync_core::service::seed::seed_sets;
use clubsync_core::service::worker::{run_sessions, spawn_session, SessionJob};
use clubsync_core::service::{OrganizationTarget, SessionOutcome};
use clubsync_core::{open_db, EntityKind, SqliteRosterStore};
use std::sync::mpsc;

fn roster(prefix: &str, count: usize) -> String {
    let mut document = String::from("<table>\n<thead>\n<tr><th>Naam</th></tr>\n</thead>\n");
    for index in 0..count {
        document.push_str(&format!(
            "<tr>\n<td>{prefix} Lid{index} (lid)</td>\n<td>06-{index}</td>\n<td></td>\n<td></td>\n<td></td>\n</tr>\n"
        ));
    }
    document.push_str("</table>\n");
    document
}

#[test]
fn sessions_for_different_clubs_run_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.db");
    drop(open_db(&path).unwrap());

    let mut jobs: Vec<SessionJob> = seed_sets().into_iter().map(SessionJob::Seed).collect();
    for (club, town) in [("Fotoclub Noord", "Groningen"), ("Fotoclub Zuid", "Maastricht")] {
        jobs.push(SessionJob::Roster {
            target: OrganizationTarget::new(OrganizationIdentity::new(club, town)),
            document: Some(roster(town, 10)),
        });
    }

    let completions = run_sessions(&path, &SyncConfig::default(), jobs);
    assert_eq!(completions.len(), 7);
    for completion in &completions {
        let report = completion.result.as_ref().unwrap();
        assert!(report.is_success(), "{}: {:?}", completion.organization, report.warnings);
        assert!(report.committed);
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteRosterStore::new(&conn);
    assert_eq!(store.count(EntityKind::Organization).unwrap(), 7);
    assert_eq!(store.count(EntityKind::Person).unwrap(), 2 + 20);
    assert_eq!(store.count(EntityKind::Membership).unwrap(), 4 + 20);
}

#[test]
fn spawned_session_reports_over_the_channel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.db");
    let (tx, rx) = mpsc::channel();
    let identity = OrganizationIdentity::new("Fotogroep Waalre", "Waalre");

    let handle = spawn_session(
        &path,
        &SyncConfig::default(),
        SessionJob::Roster {
            target: OrganizationTarget::new(identity.clone()),
            document: Some(roster("Waalre", 3)),
        },
        tx,
    )
    .unwrap();
    assert_eq!(handle.organization(), &identity);

    let completion = rx.recv().unwrap();
    assert!(handle.wait());
    assert_eq!(completion.organization, identity);
    let report = completion.result.unwrap();
    assert_eq!(report.outcome, SessionOutcome::Success);
    assert_eq!(report.rows_completed, 3);
}
