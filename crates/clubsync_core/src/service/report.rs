//! Session results surfaced to callers instead of exit codes.

use crate::model::identity::OrganizationIdentity;
use crate::reconcile::Outcome;
use crate::roster::parser::ParseState;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Whether a session is a scraped roster run or a hardcoded seed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Write failures are warnings; the session still commits.
    Live,
    /// Any write failure aborts and rolls back the session.
    Seed,
}

impl SessionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Seed => "seed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    Success,
    SuccessWithWarnings,
    Fatal,
    Cancelled,
}

impl SessionOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::SuccessWithWarnings => "success_with_warnings",
            Self::Fatal => "fatal",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for SessionOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconciliation outcomes of one entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl KindCounts {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::WriteFailed => self.failed += 1,
        }
    }

    pub fn modified(&self) -> usize {
        self.created + self.updated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub organization: OrganizationIdentity,
    pub mode: SessionMode,
    pub outcome: SessionOutcome,
    /// Completed roster rows or processed hardcoded records.
    pub rows_completed: usize,
    pub organizations: KindCounts,
    pub persons: KindCounts,
    pub memberships: KindCounts,
    pub warnings: Vec<String>,
    /// Parser state at end of input; `None` for hardcoded records.
    pub final_state: Option<ParseState>,
    pub committed: bool,
}

impl SessionReport {
    pub(crate) fn new(organization: OrganizationIdentity, mode: SessionMode) -> Self {
        Self {
            organization,
            mode,
            outcome: SessionOutcome::Success,
            rows_completed: 0,
            organizations: KindCounts::default(),
            persons: KindCounts::default(),
            memberships: KindCounts::default(),
            warnings: Vec::new(),
            final_state: None,
            committed: false,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.outcome,
            SessionOutcome::Success | SessionOutcome::SuccessWithWarnings
        )
    }

    pub(crate) fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}
