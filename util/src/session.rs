//! Session management
//!
//! A session is one run of an executable. Every session gets its own
//! directory, named after the executable and the time the session started,
//! which holds the log file, the archives and the run summary:
//!
//! ```text
//! {sessions_dir}/{exec_name}_{YYYYmmdd_HHMMSS}/
//!     {exec_name}.log
//!     summary.json
//!     arch/
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal imports
use crate::{host, time};

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

/// Time the first session of this process was started
static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Format of the timestamp in session directory names.
const DIR_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Name of the archive directory inside the session directory.
const ARCH_DIR_NAME: &str = "arch";

/// Name of the run summary file inside the session directory.
const SUMMARY_FILE_NAME: &str = "summary.json";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Paths belonging to the current session
#[derive(Clone, Debug)]
pub struct Session {
    /// Directory of this session
    pub session_root: PathBuf,

    /// Directory all archives of this session are written under
    pub arch_root: PathBuf,

    /// Log file of this session
    pub log_file_path: PathBuf,

    /// File the run summary is written to
    pub summary_path: PathBuf
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable ({}) is not set", host::SW_ROOT_ENV_VAR)]
    SwRootNotSet,

    #[error("Cannot create the session directory {0:?}: {1}")]
    CannotCreateDir(PathBuf, std::io::Error),

    #[error("Cannot get the session epoch, no session has been started")]
    NoSession
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start a new session in `sessions_dir`, relative to the software root.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        let root = host::get_sw_root().map_err(|_| SessionError::SwRootNotSet)?;

        Self::in_dir(exec_name, root.join(sessions_dir))
    }

    /// Start a new session inside an explicit directory.
    ///
    /// All sessions of one process share the epoch of the first one.
    pub fn in_dir<P: AsRef<Path>>(exec_name: &str, sessions_dir: P) -> Result<Self, SessionError> {
        let epoch = SESSION_EPOCH.get_or_init(Utc::now);

        let session_root = sessions_dir.as_ref().join(format!(
            "{}_{}",
            exec_name,
            epoch.format(DIR_TIMESTAMP_FORMAT)
        ));
        let arch_root = session_root.join(ARCH_DIR_NAME);

        // Creating the archive directory creates the session directory too
        fs::create_dir_all(&arch_root)
            .map_err(|e| SessionError::CannotCreateDir(arch_root.clone(), e))?;

        Ok(Session {
            log_file_path: session_root.join(format!("{}.log", exec_name)),
            summary_path: session_root.join(SUMMARY_FILE_NAME),
            session_root,
            arch_root
        })
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the number of seconds elapsed since the start of the session.
///
/// Returns `NaN` if no session has been started.
pub fn get_elapsed_seconds() -> f64 {
    get_epoch()
        .ok()
        .and_then(|e| time::duration_to_seconds(Utc::now() - *e))
        .unwrap_or(std::f64::NAN)
}

/// Get the time the session was started.
pub fn get_epoch() -> Result<&'static DateTime<Utc>, SessionError> {
    SESSION_EPOCH.get().ok_or(SessionError::NoSession)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_session_layout() {
        let dir = std::env::temp_dir().join("track_ctrl_session_test");
        let session = Session::in_dir("test_exec", &dir).unwrap();

        assert!(session.session_root.starts_with(&dir));
        assert!(session.arch_root.is_dir());
        assert_eq!(session.arch_root.parent(), Some(session.session_root.as_path()));
        assert_eq!(
            session.log_file_path.file_name().and_then(|n| n.to_str()),
            Some("test_exec.log")
        );
        assert_eq!(session.summary_path.parent(), Some(session.session_root.as_path()));

        // The epoch is shared, so a second session lands in the same place
        let again = Session::in_dir("test_exec", &dir).unwrap();
        assert_eq!(again.session_root, session.session_root);

        assert!(get_epoch().is_ok());
        assert!(get_elapsed_seconds() >= 0.0);
    }
}
