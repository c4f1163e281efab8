//! Durable session state: auth token, identity, and own-submission marker.
//!
//! DESIGN
//! ======
//! Session state is the only data that outlives the process. It sits on a
//! small key-value contract ([`KeyValueStore`]) so the browser-style storage
//! can be a JSON file ([`FileStore`]) or plain memory ([`MemoryStore`]).
//! On restart the stored values are the source of truth.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::error::BagError;

pub const TOKEN_KEY: &str = "lays_token";
pub const USERNAME_KEY: &str = "lays_username";
pub const EMAIL_KEY: &str = "lays_email";
pub const SUBMITTED_KEY: &str = "lays_submitted";
pub const MY_BAG_ID_KEY: &str = "lays_my_bag_id";

// =============================================================================
// KEY-VALUE STORAGE
// =============================================================================

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns [`BagError::Storage`] if the value could not be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), BagError>;

    /// # Errors
    ///
    /// Returns [`BagError::Storage`] if the removal could not be persisted.
    fn remove(&self, key: &str) -> Result<(), BagError>;

    /// # Errors
    ///
    /// Returns [`BagError::Storage`] if the store could not be emptied.
    fn clear_all(&self) -> Result<(), BagError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory store. Clones share the same map, so a clone survives a
/// simulated restart of the controller that owned the original.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BagError> {
        lock(&self.entries).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BagError> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn clear_all(&self) -> Result<(), BagError> {
        lock(&self.entries).clear();
        Ok(())
    }
}

/// JSON-file store. Every write rewrites the file through a temp file and a
/// rename so a crash never leaves a half-written session.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open `path`, loading any existing entries. A missing file is an empty
    /// store; an unreadable one is logged and treated as empty.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        Self { path, entries: Mutex::new(entries) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), BagError> {
        let json = serde_json::to_string_pretty(entries).map_err(|e| BagError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| BagError::Storage(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| BagError::Storage(e.to_string()))?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> HashMap<String, String> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "session file unreadable; starting empty");
            return HashMap::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "session file corrupt; starting empty");
            HashMap::new()
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BagError> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), BagError> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }

    fn clear_all(&self) -> Result<(), BagError> {
        lock(&self.entries).clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BagError::Storage(e.to_string())),
        }
    }
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// Invariant: `has_submitted` implies `my_design_id.is_some()`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user_name: String,
    pub user_email: String,
    pub has_submitted: bool,
    pub my_design_id: Option<String>,
}

impl SessionState {
    /// Token for a vote request. Checked in order: signed in, then submitted.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::Unauthenticated`] or [`BagError::MustSubmitFirst`].
    pub fn vote_token(&self) -> Result<&str, BagError> {
        let token = self.token.as_deref().ok_or(BagError::Unauthenticated)?;
        if !self.has_submitted {
            return Err(BagError::MustSubmitFirst);
        }
        Ok(token)
    }
}

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: SessionState,
}

impl SessionStore {
    /// Read the session from durable storage.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let token = storage.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let user_name = storage.get(USERNAME_KEY).unwrap_or_default();
        let user_email = storage.get(EMAIL_KEY).unwrap_or_default();
        let my_design_id = storage.get(MY_BAG_ID_KEY).filter(|id| !id.is_empty());
        let submitted_flag = storage.get(SUBMITTED_KEY).as_deref() == Some("1");

        let has_submitted = submitted_flag && my_design_id.is_some();
        if submitted_flag && !has_submitted {
            warn!("stored submission flag has no design id; treating as not submitted");
        }

        let state = SessionState { token, user_name, user_email, has_submitted, my_design_id };
        Self { storage, state }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.state.token.is_some()
    }

    #[must_use]
    pub fn has_submitted(&self) -> bool {
        self.state.has_submitted
    }

    #[must_use]
    pub fn my_design_id(&self) -> Option<&str> {
        self.state.my_design_id.as_deref()
    }

    /// Record a successful authentication. Memory is only updated once all
    /// three values are stored; a partial write is rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::Storage`] if the values could not be persisted.
    pub fn set_auth(&mut self, token: &str, name: &str, email: &str) -> Result<(), BagError> {
        self.write_all(&[(TOKEN_KEY, token), (USERNAME_KEY, name), (EMAIL_KEY, email)])?;
        self.state.token = Some(token.to_owned());
        self.state.user_name = name.to_owned();
        self.state.user_email = email.to_owned();
        info!(user = %name, "session authenticated");
        Ok(())
    }

    /// Record the caller's own submission. The in-memory state is updated
    /// even when persisting fails, since the server already holds the design.
    /// Storage ends up with both keys or neither.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::Storage`] if the marker could not be persisted.
    pub fn mark_submitted(&mut self, design_id: &str) -> Result<(), BagError> {
        self.state.has_submitted = true;
        self.state.my_design_id = Some(design_id.to_owned());
        self.write_all(&[(MY_BAG_ID_KEY, design_id), (SUBMITTED_KEY, "1")])
    }

    fn write_all(&self, entries: &[(&str, &str)]) -> Result<(), BagError> {
        for (done, (key, value)) in entries.iter().enumerate() {
            if let Err(e) = self.storage.set(key, value) {
                for (written, _) in &entries[..done] {
                    if let Err(undo) = self.storage.remove(written) {
                        warn!(key = %written, error = %undo, "partial session write not rolled back");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Drop everything, in memory and on disk.
    ///
    /// # Errors
    ///
    /// Returns [`BagError::Storage`] if durable storage could not be cleared.
    pub fn reset(&mut self) -> Result<(), BagError> {
        self.state = SessionState::default();
        self.storage.clear_all()
    }
}
