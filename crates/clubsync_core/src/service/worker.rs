//! Background execution of sync sessions.
//!
//! # Responsibility
//! - Run each session on its own thread with its own connection.
//! - Report completion over an `mpsc` channel.
//!
//! # Invariants
//! - Connections never cross threads; a worker opens and drops its own.
//! - A cancelled worker rolls back before reporting.

use crate::config::SyncConfig;
use crate::db::{open_db, DbError};
use crate::logging::init_logging;
use crate::model::identity::OrganizationIdentity;
use crate::repo::SqliteRosterStore;
use crate::service::report::{SessionMode, SessionReport};
use crate::service::seed::SeedSet;
use crate::service::sync_session::{OrganizationTarget, SyncSession};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Work for one session.
#[derive(Debug, Clone)]
pub enum SessionJob {
    /// Scraped roster page; `None` when the fetch produced nothing.
    Roster {
        target: OrganizationTarget,
        document: Option<String>,
    },
    Seed(SeedSet),
}

impl SessionJob {
    pub fn organization(&self) -> &OrganizationIdentity {
        match self {
            Self::Roster { target, .. } => &target.identity,
            Self::Seed(set) => &set.target.identity,
        }
    }
}

#[derive(Debug)]
pub enum WorkerError {
    Db(DbError),
    Spawn(std::io::Error),
    /// The worker thread died without reporting.
    Panicked,
}

impl Display for WorkerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Spawn(err) => write!(f, "failed to spawn session worker: {err}"),
            Self::Panicked => write!(f, "session worker panicked"),
        }
    }
}

impl Error for WorkerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Spawn(err) => Some(err),
            Self::Panicked => None,
        }
    }
}

impl From<DbError> for WorkerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

#[derive(Debug)]
pub struct SessionCompletion {
    pub organization: OrganizationIdentity,
    pub result: Result<SessionReport, WorkerError>,
}

/// Running session worker.
pub struct SessionHandle {
    organization: OrganizationIdentity,
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl SessionHandle {
    pub fn organization(&self) -> &OrganizationIdentity {
        &self.organization
    }

    /// Requests cancellation; observed before the next roster line.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Joins the worker. `false` when it panicked.
    pub fn wait(self) -> bool {
        self.thread.join().is_ok()
    }
}

pub fn spawn_session(
    db_path: &Path,
    config: &SyncConfig,
    job: SessionJob,
    completions: Sender<SessionCompletion>,
) -> Result<SessionHandle, WorkerError> {
    let organization = job.organization().clone();
    let cancel = Arc::new(AtomicBool::new(false));

    let thread = {
        let db_path = db_path.to_path_buf();
        let config = config.clone();
        let cancel = Arc::clone(&cancel);
        let organization = organization.clone();
        thread::Builder::new()
            .name(format!("clubsync-{}", organization.town))
            .spawn(move || {
                let result = run_job(&db_path, config, job, cancel);
                if let Err(err) = &result {
                    error!(
                        "event=session_worker module=service status=error organization=\"{}\" error={}",
                        organization, err
                    );
                }
                let _ = completions.send(SessionCompletion {
                    organization,
                    result,
                });
            })
            .map_err(WorkerError::Spawn)?
    };

    Ok(SessionHandle {
        organization,
        cancel,
        thread,
    })
}

/// Runs all jobs concurrently and waits for every completion.
///
/// Starts the file logger from `config.logging` first when a directory is set.
/// Completions arrive in finishing order, not job order.
pub fn run_sessions(
    db_path: impl AsRef<Path>,
    config: &SyncConfig,
    jobs: Vec<SessionJob>,
) -> Vec<SessionCompletion> {
    if let Err(err) = init_logging(&config.logging) {
        warn!(
            "event=run_sessions module=service status=logging_unavailable error={}",
            err
        );
    }
    let db_path: PathBuf = db_path.as_ref().to_path_buf();
    let (tx, rx) = mpsc::channel::<SessionCompletion>();
    let mut completions = Vec::with_capacity(jobs.len());
    let mut handles = Vec::with_capacity(jobs.len());

    for job in jobs {
        let organization = job.organization().clone();
        match spawn_session(&db_path, config, job, tx.clone()) {
            Ok(handle) => handles.push(handle),
            Err(err) => completions.push(SessionCompletion {
                organization,
                result: Err(err),
            }),
        }
    }
    drop(tx);

    completions.extend(rx.iter());

    for handle in handles {
        let organization = handle.organization().clone();
        if !handle.wait() {
            completions.push(SessionCompletion {
                organization,
                result: Err(WorkerError::Panicked),
            });
        }
    }

    info!(
        "event=run_sessions module=service status=done sessions={}",
        completions.len()
    );
    completions
}

fn run_job(
    db_path: &Path,
    config: SyncConfig,
    job: SessionJob,
    cancel: Arc<AtomicBool>,
) -> Result<SessionReport, WorkerError> {
    let conn = open_db(db_path)?;
    let session = SyncSession::new(SqliteRosterStore::new(&conn), config).with_cancel_flag(cancel);
    let report = match job {
        SessionJob::Roster { target, document } => session.sync_roster(&target, document.as_deref()),
        SessionJob::Seed(set) => session
            .with_mode(SessionMode::Seed)
            .sync_records(&set.target, &set.members),
    };
    Ok(report)
}
