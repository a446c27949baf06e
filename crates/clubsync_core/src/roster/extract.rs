//! Best-effort attribute extraction from single roster lines.
//!
//! # Responsibility
//! - Turn one tagged line into one typed value.
//! - Report malformed input as an [`ExtractionAnomaly`] next to a degraded
//!   value instead of failing.
//!
//! # Invariants
//! - Every `extract_*` function is total.
//! - `*_checked` variants never log; the plain variants log anomalies at `warn`.

use crate::model::identity::PersonIdentity;
use crate::roster::html::{attribute_value, cell_text};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

static WEBSITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9][A-Za-z0-9.-]*(:\d+)?(/\S*)?$")
        .expect("valid website regex")
});

const BIRTH_DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// Malformed roster input that was degraded to a default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionAnomaly {
    MissingName,
    IncompleteName { raw: String },
    MalformedEmail { raw: String },
    MalformedWebsite { raw: String },
    UnparsableBirthDate { raw: String },
}

impl ExtractionAnomaly {
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingName | Self::IncompleteName { .. } => "person_name",
            Self::MalformedEmail { .. } => "email",
            Self::MalformedWebsite { .. } => "external_url",
            Self::UnparsableBirthDate { .. } => "birth_date",
        }
    }
}

impl Display for ExtractionAnomaly {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "roster row has no person name"),
            Self::IncompleteName { raw } => write!(f, "person name `{raw}` has no family name"),
            Self::MalformedEmail { raw } => write!(f, "email `{raw}` is malformed"),
            Self::MalformedWebsite { raw } => write!(f, "website `{raw}` is malformed"),
            Self::UnparsableBirthDate { raw } => write!(f, "birth date `{raw}` is not a date"),
        }
    }
}

/// Value plus the anomaly that degraded it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted<T> {
    pub value: T,
    pub anomaly: Option<ExtractionAnomaly>,
}

impl<T> Extracted<T> {
    fn clean(value: T) -> Self {
        Self {
            value,
            anomaly: None,
        }
    }

    fn degraded(value: T, anomaly: ExtractionAnomaly) -> Self {
        Self {
            value,
            anomaly: Some(anomaly),
        }
    }

    fn into_logged(self) -> T {
        if let Some(anomaly) = &self.anomaly {
            log::warn!(
                "event=extract_anomaly module=roster status=degraded field={} detail=\"{}\"",
                anomaly.field(),
                anomaly
            );
        }
        self.value
    }
}

/// Person name as shown on the roster.
///
/// `full_display` keeps the status suffix ("(lid)", "(mentor)") the
/// classifiers look at; the other parts do not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonName {
    pub given: String,
    /// Lowercase particles such as "van den"; empty when absent.
    pub infix: String,
    pub family: String,
    pub full_display: String,
}

impl PersonName {
    /// Store identity: the infix is part of the family name.
    pub fn identity(&self) -> PersonIdentity {
        let family = if self.infix.is_empty() {
            self.family.clone()
        } else {
            format!("{} {}", self.infix, self.family)
        };
        PersonIdentity::new(self.given.clone(), family)
    }

    /// Name without the status suffix, used for profile links.
    pub fn display_name(&self) -> String {
        [&self.given, &self.infix, &self.family]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.given.is_empty() && self.family.is_empty()
    }
}

pub fn extract_person_name_checked(line: &str) -> Extracted<PersonName> {
    let full_display = cell_text(line);
    let name_proper = strip_status_suffix(&full_display);
    let mut words: Vec<&str> = name_proper.split_whitespace().collect();
    if words.is_empty() {
        return Extracted::degraded(
            PersonName {
                full_display,
                ..PersonName::default()
            },
            ExtractionAnomaly::MissingName,
        );
    }

    let given = words.remove(0).to_string();
    let Some(family) = words.pop() else {
        let raw = full_display.clone();
        return Extracted::degraded(
            PersonName {
                given,
                full_display,
                ..PersonName::default()
            },
            ExtractionAnomaly::IncompleteName { raw },
        );
    };

    // Everything between given and family name: particles first, then any
    // capitalised part of a compound family name.
    let split = words
        .iter()
        .position(|word| !starts_lowercase(word))
        .unwrap_or(words.len());
    let infix = words[..split].join(" ");
    let mut family_parts: Vec<&str> = words[split..].to_vec();
    family_parts.push(family);

    Extracted::clean(PersonName {
        given,
        infix,
        family: family_parts.join(" "),
        full_display,
    })
}

pub fn extract_person_name(line: &str) -> PersonName {
    extract_person_name_checked(line).into_logged()
}

/// Cell text or `None` for an empty cell.
pub fn extract_phone(line: &str) -> Option<String> {
    let text = cell_text(line);
    (!text.is_empty()).then_some(text)
}

pub fn phone_indicates_deceased(phone: Option<&str>, marker: &str) -> bool {
    phone.is_some_and(|phone| phone.trim() == marker)
}

pub fn extract_email_checked(line: &str) -> Extracted<String> {
    let raw = attribute_value(line, "href")
        .and_then(|href| href.strip_prefix("mailto:"))
        .map(|target| target.split('?').next().unwrap_or_default().to_string())
        .unwrap_or_else(|| cell_text(line));
    let raw = raw.trim().to_string();
    if raw.is_empty() {
        return Extracted::clean(String::new());
    }
    let well_formed = raw
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
    if well_formed {
        Extracted::clean(raw)
    } else {
        Extracted::degraded(String::new(), ExtractionAnomaly::MalformedEmail { raw })
    }
}

pub fn extract_email(line: &str) -> String {
    extract_email_checked(line).into_logged()
}

/// Raw link target; checked later by [`validate_website_checked`].
pub fn extract_external_url(line: &str) -> String {
    match attribute_value(line, "href") {
        Some(href) => href.trim().to_string(),
        None => cell_text(line),
    }
}

pub fn validate_website_checked(raw: &str) -> Extracted<Option<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Extracted::clean(None);
    }
    if WEBSITE_RE.is_match(raw) {
        Extracted::clean(Some(raw.to_string()))
    } else {
        Extracted::degraded(
            None,
            ExtractionAnomaly::MalformedWebsite {
                raw: raw.to_string(),
            },
        )
    }
}

pub fn validate_website(raw: &str) -> Option<String> {
    validate_website_checked(raw).into_logged()
}

pub fn extract_birth_date_checked(line: &str) -> Extracted<Option<NaiveDate>> {
    let text = cell_text(line);
    if text.is_empty() {
        return Extracted::clean(None);
    }
    match BIRTH_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&text, format).ok())
    {
        Some(date) => Extracted::clean(Some(date)),
        None => Extracted::degraded(None, ExtractionAnomaly::UnparsableBirthDate { raw: text }),
    }
}

pub fn extract_birth_date(line: &str) -> Option<NaiveDate> {
    extract_birth_date_checked(line).into_logged()
}

fn strip_status_suffix(name: &str) -> &str {
    let trimmed = name.trim_end();
    if trimmed.ends_with(')') {
        if let Some(open) = trimmed.rfind('(') {
            return trimmed[..open].trim_end();
        }
    }
    trimmed
}

fn starts_lowercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_lowercase)
}
