//! One ingestion run for one organization.
//!
//! # Responsibility
//! - Open a transaction, reconcile the organization, then each member.
//! - Drive the roster parser over a document, or apply hardcoded records.
//! - Commit once and log exactly one completion event.
//!
//! # Invariants
//! - Extraction anomalies become report warnings; they never abort a run.
//! - A cancelled run is rolled back.
//! - In seed mode the first failed write rolls the whole run back.

use crate::config::SyncConfig;
use crate::model::flags::{MemberStatus, RolesAndStatus, StatusFlags};
use crate::model::identity::{MembershipKey, OrganizationIdentity, PersonIdentity};
use crate::model::membership::{Membership, MembershipPatch};
use crate::model::organization::{Organization, OrganizationPatch};
use crate::model::person::{Person, PersonPatch};
use crate::reconcile::ReconciliationEngine;
use crate::repo::{EntityStore, TransactionalStore};
use crate::roster::classify::{is_current_member, is_mentor_or_coach, is_prospective_member};
use crate::roster::extract::{phone_indicates_deceased, validate_website_checked};
use crate::roster::parser::{ParseEvent, ParseState, RosterLineParser};
use crate::roster::profile_url::derive_internal_profile_url;
use crate::roster::{RosterRow, RowAccumulator};
use crate::service::report::{SessionMode, SessionOutcome, SessionReport};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Everything a session needs from its store.
pub trait RosterStore:
    TransactionalStore + EntityStore<Organization> + EntityStore<Person> + EntityStore<Membership>
{
}

impl<T> RosterStore for T where
    T: TransactionalStore
        + EntityStore<Organization>
        + EntityStore<Person>
        + EntityStore<Membership>
{
}

/// Organization a session reconciles, with the attributes to merge into it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationTarget {
    pub identity: OrganizationIdentity,
    pub patch: OrganizationPatch,
}

impl OrganizationTarget {
    pub fn new(identity: OrganizationIdentity) -> Self {
        Self {
            identity,
            patch: OrganizationPatch::default(),
        }
    }

    pub fn with_patch(mut self, patch: OrganizationPatch) -> Self {
        self.patch = patch;
        self
    }
}

/// One hardcoded (person, membership) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    pub person: PersonIdentity,
    pub person_patch: PersonPatch,
    pub roles_and_status: RolesAndStatus,
    pub member_website: Option<String>,
    pub latest_image: Option<String>,
}

impl MemberRecord {
    pub fn new(person: PersonIdentity) -> Self {
        Self {
            person,
            person_patch: PersonPatch::default(),
            roles_and_status: RolesAndStatus::default(),
            member_website: None,
            latest_image: None,
        }
    }
}

enum Stop {
    Cancelled,
    Fatal,
    /// No transaction could be opened; nothing to roll back.
    NotStarted,
}

type Step<T = ()> = Result<T, Stop>;

pub struct SyncSession<S> {
    engine: ReconciliationEngine<S>,
    config: SyncConfig,
    mode: SessionMode,
    cancel: Arc<AtomicBool>,
}

impl<S: RosterStore> SyncSession<S> {
    pub fn new(store: S, config: SyncConfig) -> Self {
        let engine = ReconciliationEngine::new(store, config.engine.clone());
        Self {
            engine,
            config,
            mode: SessionMode::Live,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_mode(mut self, mode: SessionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shares an externally owned cancellation flag.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn engine(&self) -> &ReconciliationEngine<S> {
        &self.engine
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Ingests one roster document. `None` (fetch failed) yields zero rows.
    pub fn sync_roster(&self, target: &OrganizationTarget, document: Option<&str>) -> SessionReport {
        let mut report = SessionReport::new(target.identity.clone(), self.mode);
        report.final_state = Some(ParseState::INITIAL);
        let result = self
            .begin(&mut report)
            .and_then(|()| self.reconcile_organization(target, &mut report))
            .and_then(|organization| self.drive_roster(&organization, document, &mut report));
        self.finish(report, result)
    }

    /// Applies hardcoded member records.
    pub fn sync_records(&self, target: &OrganizationTarget, records: &[MemberRecord]) -> SessionReport {
        let mut report = SessionReport::new(target.identity.clone(), self.mode);
        let result = self
            .begin(&mut report)
            .and_then(|()| self.reconcile_organization(target, &mut report))
            .and_then(|organization| self.apply_records(&organization, records, &mut report));
        self.finish(report, result)
    }

    fn begin(&self, report: &mut SessionReport) -> Step {
        self.check_cancelled()?;
        self.engine.store().begin().map_err(|err| {
            warn!(
                "event=sync_session module=service status=begin_failed organization=\"{}\" error={}",
                report.organization, err
            );
            report.warn(format!("could not open transaction: {err}"));
            Stop::NotStarted
        })
    }

    fn reconcile_organization(
        &self,
        target: &OrganizationTarget,
        report: &mut SessionReport,
    ) -> Step<Organization> {
        let reconciled = self
            .engine
            .find_create_update::<Organization>(&target.identity, &target.patch);
        report.organizations.record(reconciled.outcome);
        if reconciled.write_failed() {
            self.write_failure(report, format!("organization {} was not saved", target.identity))?;
        }
        Ok(reconciled.entity)
    }

    fn drive_roster(
        &self,
        organization: &Organization,
        document: Option<&str>,
        report: &mut SessionReport,
    ) -> Step {
        let Some(document) = document else {
            warn!(
                "event=sync_roster module=service status=no_document organization=\"{}\"",
                organization.identity
            );
            report.warn("no roster document available");
            return Ok(());
        };

        let mut parser = RosterLineParser::new(&self.config.anchors);
        let mut accumulator = RowAccumulator::new();
        for (index, line) in document.lines().enumerate() {
            self.check_cancelled()?;
            let Some(state) = parser.feed(line) else {
                continue;
            };
            report.final_state = Some(parser.state());
            let event = ParseEvent {
                state,
                line,
                line_number: index + 1,
            };
            if let Some(row) = accumulator.accept(&event) {
                self.apply_row(organization, row, report)?;
            }
        }
        Ok(())
    }

    fn apply_row(&self, organization: &Organization, row: RosterRow, report: &mut SessionReport) -> Step {
        report.rows_completed += 1;
        for anomaly in &row.anomalies {
            warn!(
                "event=extract_anomaly module=service status=degraded line={} field={} detail=\"{}\"",
                row.line_number,
                anomaly.field(),
                anomaly
            );
            report.warn(format!("line {}: {}", row.line_number, anomaly));
        }

        let identity = row.name.identity();
        if identity.given_name.is_empty() || identity.family_name.is_empty() {
            warn!(
                "event=sync_row module=service status=skipped line={} reason=no_person_name",
                row.line_number
            );
            report.warn(format!("line {}: row skipped, no usable person name", row.line_number));
            return Ok(());
        }

        let website = validate_website_checked(&row.external_url);
        if let Some(anomaly) = &website.anomaly {
            report.warn(format!("line {}: {}", row.line_number, anomaly));
        }
        let person_patch = PersonPatch {
            phone_number: row.phone.clone(),
            email: Some(row.email.clone()).filter(|email| !email.is_empty()),
            website: website.value,
            born_on: row.birth_date,
            is_deceased: Some(phone_indicates_deceased(
                row.phone.as_deref(),
                &self.config.deceased_phone_marker,
            )),
        };

        let shown = row.name.full_display.as_str();
        let mut status: StatusFlags = [
            (
                MemberStatus::Former,
                !is_current_member(shown, self.config.include_candidates),
            ),
            (MemberStatus::Coach, is_mentor_or_coach(shown)),
            (MemberStatus::Prospective, is_prospective_member(shown)),
        ]
        .into_iter()
        .collect();
        // Membership mirrors the person's deceased status.
        if let Some(deceased) = person_patch.is_deceased {
            status.set(MemberStatus::Deceased, deceased);
        }
        let member_website =
            derive_internal_profile_url(&self.config.profile_base_url, &row.name.display_name());
        if member_website.is_none() {
            report.warn(format!("line {}: no profile link for `{}`", row.line_number, shown));
        }
        let membership_patch = MembershipPatch {
            status,
            member_website,
            ..MembershipPatch::default()
        };

        self.reconcile_member(organization, &identity, &person_patch, &membership_patch, report)
    }

    fn apply_records(
        &self,
        organization: &Organization,
        records: &[MemberRecord],
        report: &mut SessionReport,
    ) -> Step {
        for record in records {
            self.check_cancelled()?;
            report.rows_completed += 1;
            let person_patch = record.person_patch.clone().with_status(&record.roles_and_status);
            let membership_patch = MembershipPatch {
                member_website: record.member_website.clone(),
                latest_image: record.latest_image.clone(),
                ..MembershipPatch::from_roles_and_status(&record.roles_and_status)
            };
            self.reconcile_member(organization, &record.person, &person_patch, &membership_patch, report)?;
        }
        Ok(())
    }

    fn reconcile_member(
        &self,
        organization: &Organization,
        identity: &PersonIdentity,
        person_patch: &PersonPatch,
        membership_patch: &MembershipPatch,
        report: &mut SessionReport,
    ) -> Step {
        let person = self.engine.find_create_update::<Person>(identity, person_patch);
        report.persons.record(person.outcome);
        if person.write_failed() {
            // Without a stored person there is nothing to attach a membership to.
            return self.write_failure(report, format!("person {identity} was not saved"));
        }

        let key = MembershipKey {
            organization: organization.uuid,
            person: person.entity.uuid,
        };
        let membership = self.engine.find_create_update::<Membership>(&key, membership_patch);
        report.memberships.record(membership.outcome);
        if membership.write_failed() {
            return self.write_failure(report, format!("membership of {identity} was not saved"));
        }
        Ok(())
    }

    fn write_failure(&self, report: &mut SessionReport, warning: String) -> Step {
        report.warn(warning);
        match self.mode {
            SessionMode::Live => Ok(()),
            SessionMode::Seed => Err(Stop::Fatal),
        }
    }

    fn check_cancelled(&self) -> Step {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(Stop::Cancelled);
        }
        Ok(())
    }

    fn finish(&self, mut report: SessionReport, result: Step) -> SessionReport {
        report.outcome = match result {
            Ok(()) => self.commit(&mut report),
            Err(Stop::Cancelled) => {
                self.rollback(&mut report);
                SessionOutcome::Cancelled
            }
            Err(Stop::Fatal) => {
                self.rollback(&mut report);
                SessionOutcome::Fatal
            }
            Err(Stop::NotStarted) => match self.mode {
                SessionMode::Live => SessionOutcome::SuccessWithWarnings,
                SessionMode::Seed => SessionOutcome::Fatal,
            },
        };

        info!(
            "event=sync_session module=service status={} mode={} organization=\"{}\" rows={} created={} updated={} failed={} warnings={} committed={}",
            report.outcome,
            report.mode.as_str(),
            report.organization,
            report.rows_completed,
            report.persons.created + report.memberships.created + report.organizations.created,
            report.persons.updated + report.memberships.updated + report.organizations.updated,
            report.persons.failed + report.memberships.failed + report.organizations.failed,
            report.warnings.len(),
            report.committed
        );
        report
    }

    fn commit(&self, report: &mut SessionReport) -> SessionOutcome {
        match self.engine.store().commit() {
            Ok(()) => {
                report.committed = true;
                if report.warnings.is_empty() {
                    SessionOutcome::Success
                } else {
                    SessionOutcome::SuccessWithWarnings
                }
            }
            Err(err) => {
                report.warn(format!("commit failed: {err}"));
                self.rollback(report);
                match self.mode {
                    SessionMode::Live => SessionOutcome::SuccessWithWarnings,
                    SessionMode::Seed => SessionOutcome::Fatal,
                }
            }
        }
    }

    fn rollback(&self, report: &mut SessionReport) {
        if let Err(err) = self.engine.store().rollback() {
            report.warn(format!("rollback failed: {err}"));
        }
    }
}
