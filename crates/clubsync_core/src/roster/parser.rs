//! Line-oriented roster state machine.
//!
//! # Responsibility
//! - Walk a roster document one line at a time.
//! - Emit `(state, line)` for every line containing the current state's
//!   trigger anchor, then advance to the next state.
//!
//! # Invariants
//! - Lines without the current anchor are skipped and do not advance.
//! - An anchor that never appears stalls the machine for the rest of the
//!   document; later rows are silently not produced.
//! - Output is a pure function of (document, anchors).

use serde::{Deserialize, Serialize};
use std::str::Lines;

/// Position in the roster table the parser is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseState {
    TableStart,
    TableHeader,
    RowStart,
    PersonName,
    Phone,
    EMail,
    ExternalUrl,
    BirthDate,
}

impl ParseState {
    pub const INITIAL: Self = Self::TableStart;

    /// `TableStart` and `TableHeader` occur once; the row cycle repeats.
    pub fn next(self) -> Self {
        match self {
            Self::TableStart => Self::TableHeader,
            Self::TableHeader => Self::RowStart,
            Self::RowStart => Self::PersonName,
            Self::PersonName => Self::Phone,
            Self::Phone => Self::EMail,
            Self::EMail => Self::ExternalUrl,
            Self::ExternalUrl => Self::BirthDate,
            Self::BirthDate => Self::RowStart,
        }
    }

    /// The row-completion trigger.
    pub fn completes_row(self) -> bool {
        self == Self::BirthDate
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TableStart => "table_start",
            Self::TableHeader => "table_header",
            Self::RowStart => "row_start",
            Self::PersonName => "person_name",
            Self::Phone => "phone",
            Self::EMail => "email",
            Self::ExternalUrl => "external_url",
            Self::BirthDate => "birth_date",
        }
    }
}

/// Trigger substrings of one roster page template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterAnchors {
    pub table_start: String,
    pub table_header: String,
    pub row_start: String,
    pub person_name: String,
    pub phone: String,
    pub email: String,
    pub external_url: String,
    pub birth_date: String,
}

impl Default for RosterAnchors {
    fn default() -> Self {
        Self {
            table_start: "<table".to_string(),
            table_header: "<thead".to_string(),
            row_start: "<tr".to_string(),
            person_name: "<td".to_string(),
            phone: "<td".to_string(),
            email: "<td".to_string(),
            external_url: "<td".to_string(),
            birth_date: "<td".to_string(),
        }
    }
}

impl RosterAnchors {
    pub fn trigger(&self, state: ParseState) -> &str {
        match state {
            ParseState::TableStart => &self.table_start,
            ParseState::TableHeader => &self.table_header,
            ParseState::RowStart => &self.row_start,
            ParseState::PersonName => &self.person_name,
            ParseState::Phone => &self.phone,
            ParseState::EMail => &self.email,
            ParseState::ExternalUrl => &self.external_url,
            ParseState::BirthDate => &self.birth_date,
        }
    }

    // A blank anchor would match every line.
    pub(crate) fn has_blank_anchor(&self) -> bool {
        [
            ParseState::TableStart,
            ParseState::TableHeader,
            ParseState::RowStart,
            ParseState::PersonName,
            ParseState::Phone,
            ParseState::EMail,
            ParseState::ExternalUrl,
            ParseState::BirthDate,
        ]
        .into_iter()
        .any(|state| self.trigger(state).trim().is_empty())
    }
}

/// One matched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseEvent<'d> {
    /// State whose anchor matched.
    pub state: ParseState,
    pub line: &'d str,
    /// 1-based line number within the document.
    pub line_number: usize,
}

/// Roster state machine. Feed it lines in document order.
#[derive(Debug, Clone)]
pub struct RosterLineParser<'a> {
    anchors: &'a RosterAnchors,
    state: ParseState,
}

impl<'a> RosterLineParser<'a> {
    pub fn new(anchors: &'a RosterAnchors) -> Self {
        Self {
            anchors,
            state: ParseState::INITIAL,
        }
    }

    /// State the parser is currently waiting for.
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Consumes one line; returns the matched state when the line fired.
    pub fn feed(&mut self, line: &str) -> Option<ParseState> {
        if !line.contains(self.anchors.trigger(self.state)) {
            return None;
        }
        let matched = self.state;
        self.state = matched.next();
        Some(matched)
    }

    /// Iterates over all matching lines of `document`.
    pub fn events<'d>(self, document: &'d str) -> RosterEvents<'a, 'd> {
        RosterEvents {
            parser: self,
            lines: document.lines(),
            line_number: 0,
        }
    }
}

/// Iterator returned by [`RosterLineParser::events`].
pub struct RosterEvents<'a, 'd> {
    parser: RosterLineParser<'a>,
    lines: Lines<'d>,
    line_number: usize,
}

impl RosterEvents<'_, '_> {
    /// State the underlying parser is waiting for.
    pub fn state(&self) -> ParseState {
        self.parser.state()
    }
}

impl<'d> Iterator for RosterEvents<'_, 'd> {
    type Item = ParseEvent<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            if let Some(state) = self.parser.feed(line) {
                return Some(ParseEvent {
                    state,
                    line,
                    line_number: self.line_number,
                });
            }
        }
        None
    }
}

/// Convenience: all events of one document.
pub fn parse_document<'d>(document: &'d str, anchors: &RosterAnchors) -> Vec<ParseEvent<'d>> {
    RosterLineParser::new(anchors).events(document).collect()
}
