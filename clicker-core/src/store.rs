//! Per-session game storage.
//!
//! Provides a thread-safe [`GameStore`] holding one [`GameRecord`] per
//! session. Each record sits behind its own mutex so that operations on one
//! session are serialized while different sessions proceed in parallel.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::achievement::Achievement;
use crate::state::{GameState, SessionId};
use crate::upgrade::Upgrade;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested session does not exist.
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    /// A session with this id is already stored.
    #[error("Session already exists: {0}")]
    SessionExists(String),
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Everything stored for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Scores, rates and counters.
    pub state: GameState,
    /// The session's upgrades with their current levels.
    pub upgrades: Vec<Upgrade>,
    /// The session's achievements with their unlock flags.
    pub achievements: Vec<Achievement>,
}

impl GameRecord {
    /// Session this record belongs to.
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.state.id
    }
}

type Slot = Arc<Mutex<GameRecord>>;

/// Thread-safe game storage shared by every request handler.
///
/// # Example
///
/// ```
/// use clicker_core::store::{GameRecord, GameStore};
/// use clicker_core::{GameState, SessionId};
///
/// let store = GameStore::new();
/// let record = GameRecord {
///     state: GameState::new(SessionId::new(), 0),
///     upgrades: Vec::new(),
///     achievements: Vec::new(),
/// };
///
/// let id = store.create(record).unwrap();
/// assert!(store.get(&id).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GameStore {
    sessions: Arc<RwLock<HashMap<SessionId, Slot>>>,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl GameStore {
    /// Create an in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with filesystem persistence.
    ///
    /// Sessions are saved as JSON files in `data_dir`. The directory is created
    /// if it doesn't exist. Call [`GameStore::load_all_from_disk`] to restore
    /// previously saved sessions.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            data_dir: Some(data_dir),
        })
    }

    /// The persistence directory, if any.
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Store a brand new record under its own session id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SessionExists`] if the id is taken, or a
    /// persistence error (in which case nothing is stored).
    pub fn create(&self, record: GameRecord) -> Result<SessionId, StoreError> {
        let id = record.id().clone();
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if sessions.contains_key(&id) {
            return Err(StoreError::SessionExists(id.to_string()));
        }
        self.persist(&record)?;
        sessions.insert(id.clone(), Arc::new(Mutex::new(record)));
        Ok(id)
    }

    /// Get a snapshot of a session's record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SessionNotFound`] if the session does not exist.
    pub fn get(&self, id: &SessionId) -> Result<GameRecord, StoreError> {
        let slot = self.slot(id)?;
        let record = slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(record.clone())
    }

    /// Replace the stored record for a session.
    ///
    /// Creates the session if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a persistence error, in which case the previous record is kept.
    pub fn save(&self, id: &SessionId, mut record: GameRecord) -> Result<(), StoreError> {
        record.state.id = id.clone();
        if let Ok(slot) = self.slot(id) {
            let mut current = slot.lock().unwrap_or_else(PoisonError::into_inner);
            self.persist(&record)?;
            *current = record;
            return Ok(());
        }

        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = sessions.get(id) {
            // Raced with another writer creating the same id
            let mut current = slot.lock().unwrap_or_else(PoisonError::into_inner);
            self.persist(&record)?;
            *current = record;
        } else {
            self.persist(&record)?;
            sessions.insert(id.clone(), Arc::new(Mutex::new(record)));
        }
        Ok(())
    }

    /// Read-modify-write a session under its lock.
    ///
    /// The closure works on a copy of the record. The copy is committed (and
    /// persisted) only when the closure returns `Ok`; on `Err` the stored
    /// record is untouched. Concurrent updates to the same session run one
    /// after another.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or [`StoreError::SessionNotFound`] /
    /// a persistence error converted into `E`.
    pub fn update<T, E, F>(&self, id: &SessionId, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut GameRecord) -> Result<T, E>,
        E: From<StoreError>,
    {
        let slot = self.slot(id)?;
        let mut current = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let mut draft = current.clone();
        let value = f(&mut draft)?;
        if draft != *current {
            self.persist(&draft)?;
            *current = draft;
        }
        Ok(value)
    }

    /// Whether a session exists.
    #[must_use]
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Number of stored sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the session map is intact.
    ///
    /// Returns `false` once a writer has panicked while holding the map lock.
    /// The store keeps serving requests after that, but the map may be missing
    /// the panicking writer's change.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        !self.sessions.is_poisoned()
    }

    fn slot(&self, id: &SessionId) -> Result<Slot, StoreError> {
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::SessionNotFound(id.to_string()))
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write a record to disk as JSON.
    ///
    /// Writes to a temporary file first and renames it over the old one so a
    /// crash never leaves a half-written record. No-op without a data
    /// directory.
    fn persist(&self, record: &GameRecord) -> Result<(), StoreError> {
        let Some(ref data_dir) = self.data_dir else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let name = sanitize_filename(record.id().as_str());
        let tmp = data_dir.join(format!("{name}.json.tmp"));
        let path = data_dir.join(format!("{name}.json"));
        std::fs::write(&tmp, json)?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            tracing::warn!("Failed to persist session {} to {}: {e}", record.id(), path.display());
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Load a single session file from disk into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory is configured, or the file
    /// doesn't exist or can't be parsed.
    pub fn load_session_from_disk(&self, id: &SessionId) -> Result<(), StoreError> {
        let data_dir = self
            .data_dir
            .as_ref()
            .ok_or_else(|| StoreError::SessionNotFound(id.to_string()))?;
        let path = data_dir.join(format!("{}.json", sanitize_filename(id.as_str())));
        let record = read_record(&path)?;
        self.insert_loaded(record);
        Ok(())
    }

    /// Discover and load all persisted sessions from the data directory.
    ///
    /// Files that fail to parse are logged and skipped. Returns the ids that
    /// were loaded; an in-memory store returns an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory can't be read.
    pub fn load_all_from_disk(&self) -> Result<Vec<SessionId>, StoreError> {
        let Some(ref data_dir) = self.data_dir else {
            return Ok(Vec::new());
        };
        let mut loaded = Vec::new();
        for entry in std::fs::read_dir(data_dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match read_record(&path) {
                Ok(record) => loaded.push(self.insert_loaded(record)),
                Err(e) => {
                    tracing::warn!("Skipping unreadable session file {}: {e}", path.display());
                }
            }
        }
        Ok(loaded)
    }

    fn insert_loaded(&self, record: GameRecord) -> SessionId {
        let id = record.id().clone();
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        sessions.insert(id.clone(), Arc::new(Mutex::new(record)));
        id
    }
}

fn read_record(path: &Path) -> Result<GameRecord, StoreError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Sanitize a session ID for use as a filename.
///
/// Replaces any character that is not alphanumeric, `-`, or `_` with `_`.
fn sanitize_filename(session_id: &str) -> String {
    session_id
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
