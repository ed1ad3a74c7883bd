#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! JSON users file behind the persistence boundary.
//!
//! Reads never fail: a missing file yields no users, a corrupt one is moved
//! aside and malformed records are skipped. Writes go through a staged
//! snapshot that [`UserStore::flush`] persists, so a termination handler can
//! flush whatever the game last committed.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use escape_maze_core::UpgradeTuning;
use escape_maze_system_progression::{Profile, ProfileData, Roster};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Version written into every users file.
pub const FILE_VERSION: u32 = 1;

/// Failures while writing the users file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The file or its temporary sibling could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// File being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The users could not be encoded.
    #[error("failed to encode users: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct UsersFile<'a> {
    version: u32,
    users: &'a [ProfileData],
}

#[derive(Deserialize)]
struct RawUsersFile {
    version: u32,
    users: Vec<serde_json::Value>,
}

/// Users file with a staged snapshot awaiting a flush.
///
/// Clones share the staged snapshot.
#[derive(Clone, Debug)]
pub struct UserStore {
    path: PathBuf,
    staged: Arc<Mutex<Option<Vec<ProfileData>>>>,
}

impl UserStore {
    /// Store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            staged: Arc::new(Mutex::new(None)),
        }
    }

    /// Path of the users file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path a corrupt users file is moved to.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// Reads every valid user from the file.
    pub fn import_users(&self, tuning: &UpgradeTuning) -> Vec<Profile> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no users file yet");
                return Vec::new();
            }
            Err(err) => {
                warn!(path = %self.path.display(), %err, "failed to read users file");
                return Vec::new();
            }
        };

        let raw: RawUsersFile = match serde_json::from_str(&contents) {
            Ok(raw) => raw,
            Err(err) => {
                self.move_aside(&err.to_string());
                return Vec::new();
            }
        };
        if raw.version != FILE_VERSION {
            self.move_aside(&format!("unsupported version {}", raw.version));
            return Vec::new();
        }

        let total = raw.users.len();
        let users: Vec<Profile> = raw
            .users
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                let restored = serde_json::from_value::<ProfileData>(value)
                    .map_err(|err| err.to_string())
                    .and_then(|data| {
                        Profile::from_data(data, tuning).map_err(|err| err.to_string())
                    });
                match restored {
                    Ok(profile) => Some(profile),
                    Err(reason) => {
                        warn!(index, %reason, "skipping malformed user record");
                        None
                    }
                }
            })
            .collect();
        info!(imported = users.len(), skipped = total - users.len(), "users imported");
        users
    }

    /// Writes the users who have ever played, replacing the file.
    pub fn export_users(&self, profiles: &[Profile]) -> Result<usize, PersistenceError> {
        let users: Vec<ProfileData> = profiles
            .iter()
            .filter(|profile| profile.has_ever_played())
            .map(Profile::to_data)
            .collect();
        self.write(&users)?;
        info!(exported = users.len(), path = %self.path.display(), "users exported");
        Ok(users.len())
    }

    /// Stages the roster's exportable users for the next flush.
    pub fn commit(&self, roster: &Roster) {
        let users: Vec<ProfileData> = roster.exportable().map(Profile::to_data).collect();
        *self.staged.lock().unwrap_or_else(PoisonError::into_inner) = Some(users);
    }

    /// Writes the staged snapshot, if any.
    ///
    /// Returns whether anything was written. Flushing twice in a row writes
    /// once, which makes the call safe from a termination handler.
    pub fn flush(&self) -> Result<bool, PersistenceError> {
        let mut staged = self.staged.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(users) = staged.as_ref() else {
            return Ok(false);
        };
        self.write(users)?;
        info!(exported = users.len(), path = %self.path.display(), "users flushed");
        *staged = None;
        Ok(true)
    }

    fn write(&self, users: &[ProfileData]) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(&UsersFile {
            version: FILE_VERSION,
            users,
        })?;
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, json).map_err(|source| PersistenceError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| PersistenceError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn move_aside(&self, reason: &str) {
        let backup = self.backup_path();
        match fs::rename(&self.path, &backup) {
            Ok(()) => warn!(
                path = %self.path.display(),
                backup = %backup.display(),
                reason,
                "users file is corrupt, moved it aside"
            ),
            Err(err) => warn!(
                path = %self.path.display(),
                reason,
                %err,
                "users file is corrupt and could not be moved aside"
            ),
        }
    }
}
