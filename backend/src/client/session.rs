//! Cached login session for the command-line client.
//!
//! The session lives in a single JSON file inside a capability-scoped
//! directory. A missing or unreadable file means the caller is anonymous;
//! it is never an error.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::domain::Role;
use crate::inbound::http::accounts::AccountResponse;

const SESSION_FILENAME: &str = "session.json";

/// Signed-in caller: the bearer credential plus the account it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub account: AccountResponse,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.account.role == Role::Admin
    }
}

/// Failures writing or removing the session file.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session file operation failed ({path}): {message}")]
    Io { path: PathBuf, message: String },
    #[error("session could not be encoded: {message}")]
    Encode { message: String },
}

impl SessionStoreError {
    fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

/// Session cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path of the session file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILENAME)
    }

    /// Read the cached session.
    ///
    /// Returns `None` when the directory or file is absent, unreadable, or
    /// does not decode; the latter two are logged.
    pub fn load(&self) -> Option<Session> {
        let dir = match Dir::open_ambient_dir(&self.dir, ambient_authority()) {
            Ok(dir) => dir,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return None,
            Err(error) => {
                warn!(path = %self.dir.display(), error = %error, "session directory unreadable");
                return None;
            }
        };
        let raw = match dir.read(SESSION_FILENAME) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return None,
            Err(error) => {
                warn!(path = %self.path().display(), error = %error, "session file unreadable");
                return None;
            }
        };
        match serde_json::from_slice(&raw) {
            Ok(session) => Some(session),
            Err(error) => {
                warn!(path = %self.path().display(), error = %error, "ignoring corrupt session file");
                None
            }
        }
    }

    /// Persist `session`, creating the directory when needed.
    pub fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let encoded = serde_json::to_vec_pretty(session).map_err(|error| {
            SessionStoreError::Encode {
                message: error.to_string(),
            }
        })?;
        Dir::create_ambient_dir_all(&self.dir, ambient_authority())
            .map_err(|error| SessionStoreError::io(&self.dir, error))?;
        let dir = Dir::open_ambient_dir(&self.dir, ambient_authority())
            .map_err(|error| SessionStoreError::io(&self.dir, error))?;
        dir.write(SESSION_FILENAME, encoded)
            .map_err(|error| SessionStoreError::io(self.path(), error))
    }

    /// Forget the cached session. Clearing an absent session succeeds.
    pub fn clear(&self) -> Result<(), SessionStoreError> {
        let dir = match Dir::open_ambient_dir(&self.dir, ambient_authority()) {
            Ok(dir) => dir,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(SessionStoreError::io(&self.dir, error)),
        };
        match dir.remove_file(SESSION_FILENAME) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SessionStoreError::io(self.path(), error)),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
