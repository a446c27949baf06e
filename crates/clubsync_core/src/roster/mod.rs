//! Roster page ingestion: line parser, extractors and row assembly.
//!
//! # Responsibility
//! - Turn `(state, line)` parser events into complete [`RosterRow`] records.
//!
//! # Invariants
//! - A row is produced only on the `BirthDate` event.
//! - A `PersonName` event discards any unfinished row.
//! - Anomalies travel with the row; nothing here fails.

pub mod classify;
pub mod extract;
pub mod html;
pub mod parser;
pub mod profile_url;

use chrono::NaiveDate;
use extract::{
    extract_birth_date_checked, extract_email_checked, extract_external_url,
    extract_person_name_checked, extract_phone, ExtractionAnomaly, Extracted, PersonName,
};
use parser::{ParseEvent, ParseState, RosterAnchors, RosterLineParser};

/// One completed roster table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub name: PersonName,
    pub phone: Option<String>,
    pub email: String,
    /// Unvalidated link target.
    pub external_url: String,
    pub birth_date: Option<NaiveDate>,
    pub anomalies: Vec<ExtractionAnomaly>,
    /// Line of the `PersonName` cell.
    pub line_number: usize,
}

/// Collects cell values between `PersonName` and `BirthDate`.
#[derive(Debug, Default)]
pub struct RowAccumulator {
    name: PersonName,
    phone: Option<String>,
    email: String,
    external_url: String,
    anomalies: Vec<ExtractionAnomaly>,
    line_number: usize,
}

impl RowAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event; returns the row when the event completes it.
    pub fn accept(&mut self, event: &ParseEvent<'_>) -> Option<RosterRow> {
        match event.state {
            ParseState::TableStart | ParseState::TableHeader | ParseState::RowStart => None,
            ParseState::PersonName => {
                *self = Self {
                    line_number: event.line_number,
                    ..Self::default()
                };
                self.name = self.take(extract_person_name_checked(event.line));
                None
            }
            ParseState::Phone => {
                self.phone = extract_phone(event.line);
                None
            }
            ParseState::EMail => {
                self.email = self.take(extract_email_checked(event.line));
                None
            }
            ParseState::ExternalUrl => {
                self.external_url = extract_external_url(event.line);
                None
            }
            ParseState::BirthDate => {
                let birth_date = self.take(extract_birth_date_checked(event.line));
                let finished = std::mem::take(self);
                Some(RosterRow {
                    name: finished.name,
                    phone: finished.phone,
                    email: finished.email,
                    external_url: finished.external_url,
                    birth_date,
                    anomalies: finished.anomalies,
                    line_number: finished.line_number,
                })
            }
        }
    }

    fn take<T>(&mut self, extracted: Extracted<T>) -> T {
        self.anomalies.extend(extracted.anomaly);
        extracted.value
    }
}

/// Rows of a whole document plus the state the parser stopped in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterScan {
    pub rows: Vec<RosterRow>,
    pub final_state: ParseState,
}

pub fn scan_document(document: &str, anchors: &RosterAnchors) -> RosterScan {
    let mut events = RosterLineParser::new(anchors).events(document);
    let mut accumulator = RowAccumulator::new();
    let mut rows = Vec::new();
    for event in events.by_ref() {
        rows.extend(accumulator.accept(&event));
    }
    RosterScan {
        rows,
        final_state: events.state(),
    }
}
