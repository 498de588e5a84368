//! Session management

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal imports
use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// strftime format of the timestamp in session directory names
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Directories and files belonging to one run of an executable.
///
/// Creating a session also fixes the process-wide epoch used for log timestamps and
/// [`get_elapsed_seconds`].
#[derive(Clone, Debug)]
pub struct Session {
    /// `{sessions_dir}/{exec_name}_{timestamp}`
    pub session_root: PathBuf,

    /// CSV archives are written here
    pub arch_root: PathBuf,

    /// `{session_root}/{exec_name}.log`
    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable (TRAJ_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error(
        "Cannot initialise the session epoch, have you already initialised the\
         session? (conquer_once error: {0})"
    )]
    CannotInitEpoch(conquer_once::TryInitError),

    #[error("Cannot get the epoch time, did you forget to initialise the session?")]
    CannotGetEpoch,

    #[error("Cannot serialise data for {0:?}: {1}")]
    SerialiseError(PathBuf, serde_json::Error),

    #[error("Cannot write session file {0:?}: {1}")]
    WriteError(PathBuf, std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start a new session within the given directory.
    ///
    /// This will create a new session directory named `{exec_name}_{timestamp}` inside
    /// `$TRAJ_SW_ROOT/{sessions_dir}`.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        let root = crate::host::get_sw_root().map_err(|_| SessionError::SwRootNotSet)?;

        let mut sessions_path = root;
        sessions_path.push(sessions_dir);

        Self::new_in(exec_name, sessions_path)
    }

    /// Start a new session inside an arbitrary directory on the host.
    pub fn new_in<P: AsRef<Path>>(exec_name: &str, sessions_dir: P) -> Result<Self, SessionError> {
        // A process only ever has one session
        SESSION_EPOCH
            .try_init_once(Utc::now)
            .map_err(SessionError::CannotInitEpoch)?;

        let epoch = get_epoch().ok_or(SessionError::CannotGetEpoch)?;

        let session_root = sessions_dir
            .as_ref()
            .join(format!("{}_{}", exec_name, epoch.format(TIMESTAMP_FORMAT)));
        let arch_root = session_root.join("arch");
        let log_file_path = session_root.join(format!("{}.log", exec_name));

        fs::create_dir_all(&arch_root).map_err(SessionError::CannotCreateDir)?;

        Ok(Session {
            session_root,
            arch_root,
            log_file_path,
        })
    }

    /// Serialise the given data as pretty JSON into the session-relative path.
    pub fn save_json<P: AsRef<Path>, T: Serialize>(
        &self,
        path: P,
        data: &T,
    ) -> Result<(), SessionError> {
        let file_path = self.session_root.join(path);

        let json = serde_json::to_string_pretty(data)
            .map_err(|e| SessionError::SerialiseError(file_path.clone(), e))?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).map_err(SessionError::CannotCreateDir)?;
        }

        fs::write(&file_path, json).map_err(|e| SessionError::WriteError(file_path.clone(), e))?;

        info!("Saved {:?}", file_path);

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Seconds since the session was created, `NaN` before then.
pub fn get_elapsed_seconds() -> f64 {
    get_epoch()
        .and_then(|e| time::duration_to_seconds(Utc::now() - *e))
        .unwrap_or(std::f64::NAN)
}

/// The time the session was created, if it has been.
pub fn get_epoch() -> Option<&'static DateTime<Utc>> {
    SESSION_EPOCH.get()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::archive::Archiver;

    #[derive(Serialize)]
    struct Record {
        time_s: f64,
        value: f64,
    }

    // The epoch can only be set once per process, so everything needing a session lives here
    #[test]
    fn test_session() {
        assert!(get_elapsed_seconds().is_nan());

        let dir = std::env::temp_dir().join(format!("util_session_test_{}", std::process::id()));
        let session = Session::new_in("test_exec", &dir).unwrap();

        assert!(session.arch_root.is_dir());
        assert!(session.session_root.starts_with(&dir));
        assert!(get_elapsed_seconds() >= 0.0);
        assert!(get_epoch().is_some());

        // A second session in the same process is rejected
        assert!(matches!(
            Session::new_in("test_exec", &dir),
            Err(SessionError::CannotInitEpoch(_))
        ));

        session.save_json("data/values.json", &vec![1.0, 2.0]).unwrap();
        let json = fs::read_to_string(session.session_root.join("data/values.json")).unwrap();
        let values: Vec<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(values, vec![1.0, 2.0]);

        let mut arch = Archiver::from_path(&session, "records.csv").unwrap();
        assert!(arch.is_enabled());
        arch.serialise(Record {
            time_s: 0.5,
            value: 2.0,
        })
        .unwrap();

        let csv = fs::read_to_string(session.arch_root.join("records.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["time_s,value", "0.5,2.0"]);

        fs::remove_dir_all(&dir).ok();
    }
}
