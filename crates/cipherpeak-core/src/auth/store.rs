//! Persisted session store.
//!
//! Holds the current `Credential` in memory and mirrors every change to a
//! session file, so a login survives process restarts. All mutations replace
//! the whole value under a lock: readers never observe a half-written
//! credential. Persistence failures are logged and swallowed - the in-memory
//! state stays authoritative for the running process even if durability is
//! lost.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::credential::{Credential, Subject};

/// Session file name in the cache directory
const SESSION_FILE: &str = "session.json";

pub struct SessionStore {
    cache_dir: PathBuf,
    current: RwLock<Option<Credential>>,
}

impl SessionStore {
    /// Create a store with no credential, without touching the disk.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            current: RwLock::new(None),
        }
    }

    /// Load the last persisted credential, if any.
    ///
    /// A missing, unreadable, or malformed session file degrades to the
    /// unauthenticated state - corruption means "logged out", never an
    /// error. An expired access token is kept: it still carries the refresh
    /// token the next request will trade in.
    pub fn load(cache_dir: PathBuf) -> Self {
        let store = Self::new(cache_dir);
        let path = store.session_path();
        if !path.exists() {
            return store;
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Credential>(&contents) {
                Ok(credential) => {
                    debug!(user = %credential.subject.user, "session loaded from disk");
                    *store.write_lock() = Some(credential);
                }
                Err(err) => {
                    warn!(error = %err, "session file is malformed, starting logged out");
                }
            },
            Err(err) => {
                warn!(error = %err, "could not read session file, starting logged out");
            }
        }

        store
    }

    /// Current credential, if any.
    pub fn get(&self) -> Option<Credential> {
        self.read_lock().clone()
    }

    /// Whether a credential is present. Says nothing about expiry.
    pub fn is_authenticated(&self) -> bool {
        self.read_lock().is_some()
    }

    /// Install a brand-new credential from a login exchange.
    pub fn set_login(&self, access_token: String, refresh_token: String, subject: Subject) {
        let credential = Credential {
            access_token,
            refresh_token,
            subject,
        };
        self.persist(&credential);
        *self.write_lock() = Some(credential);
    }

    /// Replace the token fields after a refresh exchange.
    ///
    /// When the exchange did not return a new refresh token the previous one
    /// is retained; the subject is carried over unchanged.
    pub fn set_refreshed(&self, access_token: String, refresh_token: Option<String>) {
        let Some(previous) = self.get() else {
            warn!("refresh result arrived with no active session, ignoring");
            return;
        };

        let credential = Credential {
            access_token,
            refresh_token: refresh_token.unwrap_or(previous.refresh_token),
            subject: previous.subject,
        };
        self.persist(&credential);
        *self.write_lock() = Some(credential);
    }

    /// Drop the credential and remove it from disk.
    pub fn clear(&self) {
        *self.write_lock() = None;
        let path = self.session_path();
        if path.exists() {
            if let Err(err) = fs::remove_file(&path) {
                warn!(error = %err, "could not remove session file");
            }
        }
    }

    fn persist(&self, credential: &Credential) {
        let path = self.session_path();
        if let Err(err) = try_persist(credential, &path) {
            warn!(error = %err, path = %path.display(), "could not persist session");
        }
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Option<Credential>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Option<Credential>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn try_persist(credential: &Credential, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(credential)?;
    write_private(path, &contents)?;
    Ok(())
}

/// Write with owner-only permissions; tokens should not be world-readable.
#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    fs::write(path, contents)
}
