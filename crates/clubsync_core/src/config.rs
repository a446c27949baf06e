//! Runtime configuration for sync sessions.
//!
//! # Responsibility
//! - Carry the knobs that used to be process-wide toggles as plain values.
//! - Describe the roster page template (trigger anchors) as data.
//!
//! # Invariants
//! - Every field has a default; a partial JSON document is a valid config.
//! - Defaults describe the Fotogroep Waalre member page.

use crate::logging::LoggingConfig;
use crate::roster::parser::RosterAnchors;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Phone cell content that marks a member as deceased.
pub const DEFAULT_DECEASED_PHONE_MARKER: &str = "[overleden]";
/// Base for derived member portfolio links.
pub const DEFAULT_PROFILE_BASE_URL: &str = "https://www.fotogroepwaalre.nl/fotos";

/// Reconciliation engine options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Commit after every modifying find-create-update call.
    ///
    /// Diagnostic mode only: it trades the single end-of-session commit for
    /// traceability, so a cancelled session is no longer all-or-nothing.
    pub eager_save: bool,
}

/// Options for one roster sync session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub engine: EngineConfig,
    pub anchors: RosterAnchors,
    pub profile_base_url: String,
    /// Count prospective members as current when deriving `former`.
    pub include_candidates: bool,
    pub deceased_phone_marker: String,
    pub logging: LoggingConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            anchors: RosterAnchors::default(),
            profile_base_url: DEFAULT_PROFILE_BASE_URL.to_string(),
            include_candidates: true,
            deceased_phone_marker: DEFAULT_DECEASED_PHONE_MARKER.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Parses a JSON config; missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profile_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("profile_base_url must not be blank"));
        }
        if self.deceased_phone_marker.is_empty() {
            return Err(ConfigError::Invalid("deceased_phone_marker must not be empty"));
        }
        if self.anchors.has_blank_anchor() {
            return Err(ConfigError::Invalid("roster anchors must not be blank"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid sync config: {err}"),
            Self::Invalid(message) => write!(f, "invalid sync config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SyncConfig, DEFAULT_DECEASED_PHONE_MARKER};

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SyncConfig::from_json_str(r#"{"engine": {"eager_save": true}}"#)
            .expect("partial config should parse");
        assert!(config.engine.eager_save);
        assert!(config.include_candidates);
        assert_eq!(config.deceased_phone_marker, DEFAULT_DECEASED_PHONE_MARKER);
        assert_eq!(config.anchors.person_name, "<td");
        assert_eq!(config.logging.directory, None);
    }

    #[test]
    fn logging_section_is_read() {
        let config = SyncConfig::from_json_str(
            r#"{"logging": {"level": "warn", "directory": "/var/log/clubsync"}}"#,
        )
        .expect("logging section should parse");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(
            config.logging.directory.as_deref(),
            Some(std::path::Path::new("/var/log/clubsync"))
        );
    }

    #[test]
    fn blank_anchor_is_rejected() {
        let err = SyncConfig::from_json_str(r#"{"anchors": {"birth_date": "  "}}"#)
            .expect_err("blank anchor must fail");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let err = SyncConfig::from_json_str("{").expect_err("truncated json must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
