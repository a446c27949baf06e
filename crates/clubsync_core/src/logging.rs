//! Process-wide log sink for sync runs.
//!
//! # Responsibility
//! - Start one rotating `clubsync` log file per process from [`LoggingConfig`].
//! - Record which seed data and schema versions a process ingests with.
//!
//! # Invariants
//! - A config without a directory leaves logging off; `log` calls are no-ops.
//! - Re-initializing with the same level and directory is a no-op.
//! - Re-initializing with anything else is rejected, never applied.

use crate::db::migrations::latest_version;
use crate::service::seed::SEED_DATA_VERSION;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::info;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "clubsync";

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    status: LoggingStatus,
    _handle: LoggerHandle,
}

/// Log sink settings, usually the `logging` section of a sync config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for log files. `None` disables file logging.
    pub directory: Option<PathBuf>,
    pub max_file_bytes: u64,
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            directory: None,
            max_file_bytes: 10 * 1024 * 1024,
            max_files: 5,
        }
    }
}

/// Level and directory of the running logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingStatus {
    pub level: &'static str,
    pub log_dir: PathBuf,
}

#[derive(Debug)]
pub enum LoggingError {
    UnknownLevel(String),
    RelativeDirectory(PathBuf),
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
    /// A logger with different settings is already running.
    Conflict {
        active: LoggingStatus,
        requested_level: &'static str,
        requested_dir: PathBuf,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeDirectory(path) => {
                write!(f, "log directory must be absolute, got `{}`", path.display())
            }
            Self::CreateDirectory { path, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                path.display()
            ),
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::Conflict {
                active,
                requested_level,
                requested_dir,
            } => write!(
                f,
                "logging already runs at {} in `{}`; refusing {} in `{}`",
                active.level,
                active.log_dir.display(),
                requested_level,
                requested_dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Starts the file logger described by `config`.
///
/// Returns `Ok(None)` when `config.directory` is unset.
///
/// # Errors
/// Unknown level, relative or uncreatable directory, backend failure, or a
/// running logger with different settings.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<LoggingStatus>, LoggingError> {
    let Some(directory) = &config.directory else {
        return Ok(None);
    };
    let level = normalize_level(&config.level)?;
    if !directory.is_absolute() {
        return Err(LoggingError::RelativeDirectory(directory.clone()));
    }

    let active = ACTIVE.get_or_try_init(|| start(config, level, directory))?;
    if active.status.level != level || &active.status.log_dir != directory {
        return Err(LoggingError::Conflict {
            active: active.status.clone(),
            requested_level: level,
            requested_dir: directory.clone(),
        });
    }
    Ok(Some(active.status.clone()))
}

fn start(
    config: &LoggingConfig,
    level: &'static str,
    directory: &Path,
) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(directory).map_err(|source| LoggingError::CreateDirectory {
        path: directory.to_path_buf(),
        source,
    })?;

    let handle = Logger::try_with_str(level)
        .map_err(LoggingError::Backend)?
        .log_to_file(
            FileSpec::default()
                .directory(directory)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(config.max_file_bytes.max(1)),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.max_files.max(1)),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LoggingError::Backend)?;

    info!(
        "event=clubsync_start module=logging status=ok version={} schema_version={} seed_data_version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        latest_version(),
        SEED_DATA_VERSION,
        level,
        directory.display()
    );

    Ok(ActiveLogger {
        status: LoggingStatus {
            level,
            log_dir: directory.to_path_buf(),
        },
        _handle: handle,
    })
}

/// Settings of the running logger, if any.
pub fn logging_status() -> Option<LoggingStatus> {
    ACTIVE.get().map(|active| active.status.clone())
}

/// `debug` in debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnknownLevel(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, normalize_level, LoggingConfig, LoggingError};
    use std::path::PathBuf;

    #[test]
    fn levels_are_normalized() {
        assert_eq!(normalize_level(" INFO ").unwrap(), "info");
        assert_eq!(normalize_level("warning").unwrap(), "warn");
        assert!(matches!(
            normalize_level("loud"),
            Err(LoggingError::UnknownLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn config_without_directory_leaves_logging_off() {
        assert_eq!(init_logging(&LoggingConfig::default()).unwrap(), None);
    }

    #[test]
    fn relative_directory_is_rejected() {
        let config = LoggingConfig {
            directory: Some(PathBuf::from("logs/dev")),
            ..LoggingConfig::default()
        };
        assert!(matches!(
            init_logging(&config),
            Err(LoggingError::RelativeDirectory(_))
        ));
    }

    #[test]
    fn partial_json_section_keeps_rotation_defaults() {
        let config: LoggingConfig = serde_json::from_str(r#"{"level": "warn"}"#).unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(config.directory, None);
        assert_eq!(config.max_files, LoggingConfig::default().max_files);
    }

    // The only test that starts the process-wide logger.
    #[test]
    fn second_init_must_match_the_running_logger() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "info".to_string(),
            directory: Some(dir.path().join("logs")),
            ..LoggingConfig::default()
        };

        let status = init_logging(&config).unwrap().unwrap();
        assert_eq!(status.level, "info");
        assert_eq!(init_logging(&config).unwrap(), Some(status.clone()));
        assert_eq!(logging_status(), Some(status));

        let louder = LoggingConfig {
            level: "debug".to_string(),
            ..config.clone()
        };
        assert!(matches!(
            init_logging(&louder),
            Err(LoggingError::Conflict { .. })
        ));

        let elsewhere = LoggingConfig {
            directory: Some(dir.path().join("other")),
            ..config
        };
        let err = init_logging(&elsewhere).unwrap_err();
        assert!(err.to_string().contains("refusing"));
    }
}
