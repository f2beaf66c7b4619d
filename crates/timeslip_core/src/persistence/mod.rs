//! Journal snapshot persistence adapter.
//!
//! # Responsibility
//! - Serialize the journal snapshot into a single storage slot.
//! - Decode and validate what the slot holds on load.
//!
//! # Invariants
//! - `save`/`load`/`clear` never surface errors; failures are logged.
//! - A malformed slot is indistinguishable from an empty one.
//! - Persistence failure never touches in-memory journal state.

use crate::model::entry::EntryValidationError;
use crate::model::snapshot::JournalSnapshot;
use crate::storage::KeyValueStore;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot key holding the journal snapshot.
pub const JOURNAL_STORAGE_KEY: &str = "time-bending-horror-journal";

/// Outcome of reading the snapshot slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotLoad {
    Loaded(JournalSnapshot),
    /// Nothing is stored under the key.
    Empty,
    /// A payload is stored but failed decoding or validation.
    Rejected,
    /// The backend could not be read.
    ReadFailed,
}

impl SnapshotLoad {
    pub fn into_snapshot(self) -> Option<JournalSnapshot> {
        match self {
            Self::Loaded(snapshot) => Some(snapshot),
            Self::Empty | Self::Rejected | Self::ReadFailed => None,
        }
    }
}

/// Best-effort snapshot persistence.
pub trait SnapshotPersistence {
    /// Writes `snapshot`; failures are logged and swallowed.
    fn save(&self, snapshot: &JournalSnapshot);
    /// Reads the slot, reporting why nothing usable came back.
    fn read(&self) -> SnapshotLoad;
    /// Returns the stored snapshot when present and well-formed.
    fn load(&self) -> Option<JournalSnapshot> {
        self.read().into_snapshot()
    }
    /// Removes the stored snapshot; failures are logged and swallowed.
    fn clear(&self);
}

/// Why a stored payload was rejected.
#[derive(Debug)]
pub enum SnapshotDecodeError {
    Json(serde_json::Error),
    /// Top-level value is not a JSON object.
    NotAnObject,
    /// `entries` is missing or not an array.
    EntriesNotAnArray,
    /// One entry decoded but failed structural validation.
    InvalidEntry {
        index: usize,
        source: EntryValidationError,
    },
}

impl Display for SnapshotDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "snapshot is not valid journal JSON: {err}"),
            Self::NotAnObject => write!(f, "snapshot is not a JSON object"),
            Self::EntriesNotAnArray => write!(f, "snapshot `entries` is missing or not an array"),
            Self::InvalidEntry { index, source } => {
                write!(f, "snapshot entry #{index} is invalid: {source}")
            }
        }
    }
}

impl Error for SnapshotDecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidEntry { source, .. } => Some(source),
            Self::NotAnObject | Self::EntriesNotAnArray => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotDecodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Serializes a snapshot into its stored JSON form.
pub fn encode_snapshot(snapshot: &JournalSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

/// Decodes and validates a stored JSON payload.
pub fn decode_snapshot(raw: &str) -> Result<JournalSnapshot, SnapshotDecodeError> {
    let value: Value = serde_json::from_str(raw)?;
    let object = value.as_object().ok_or(SnapshotDecodeError::NotAnObject)?;
    if !object.get("entries").is_some_and(Value::is_array) {
        return Err(SnapshotDecodeError::EntriesNotAnArray);
    }

    let snapshot: JournalSnapshot = serde_json::from_value(value)?;
    for (index, entry) in snapshot.entries.iter().enumerate() {
        entry
            .validate()
            .map_err(|source| SnapshotDecodeError::InvalidEntry { index, source })?;
    }
    Ok(snapshot)
}

/// Snapshot persistence over the journal key of a slot store.
pub struct SlotPersistence<K: KeyValueStore> {
    store: K,
}

impl<K: KeyValueStore> SlotPersistence<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }
}

impl<K: KeyValueStore> SnapshotPersistence for SlotPersistence<K> {
    fn save(&self, snapshot: &JournalSnapshot) {
        let payload = match encode_snapshot(snapshot) {
            Ok(payload) => payload,
            Err(err) => {
                error!(
                    "event=snapshot_save module=persistence status=error error_code=serialize_failed key={} error={}",
                    JOURNAL_STORAGE_KEY, err
                );
                return;
            }
        };

        match self.store.set(JOURNAL_STORAGE_KEY, &payload) {
            Ok(()) => debug!(
                "event=snapshot_save module=persistence status=ok key={} entries={} bytes={}",
                JOURNAL_STORAGE_KEY,
                snapshot.entries.len(),
                payload.len()
            ),
            Err(err) => error!(
                "event=snapshot_save module=persistence status=error error_code=write_failed key={} error={}",
                JOURNAL_STORAGE_KEY, err
            ),
        }
    }

    fn read(&self) -> SnapshotLoad {
        let raw = match self.store.get(JOURNAL_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(
                    "event=snapshot_load module=persistence status=empty key={}",
                    JOURNAL_STORAGE_KEY
                );
                return SnapshotLoad::Empty;
            }
            Err(err) => {
                error!(
                    "event=snapshot_load module=persistence status=error error_code=read_failed key={} error={}",
                    JOURNAL_STORAGE_KEY, err
                );
                return SnapshotLoad::ReadFailed;
            }
        };

        match decode_snapshot(&raw) {
            Ok(snapshot) => {
                info!(
                    "event=snapshot_load module=persistence status=ok key={} entries={}",
                    JOURNAL_STORAGE_KEY,
                    snapshot.entries.len()
                );
                SnapshotLoad::Loaded(snapshot)
            }
            Err(err) => {
                warn!(
                    "event=snapshot_load module=persistence status=rejected error_code=malformed key={} error={}",
                    JOURNAL_STORAGE_KEY, err
                );
                SnapshotLoad::Rejected
            }
        }
    }

    fn clear(&self) {
        match self.store.remove(JOURNAL_STORAGE_KEY) {
            Ok(()) => info!(
                "event=snapshot_clear module=persistence status=ok key={}",
                JOURNAL_STORAGE_KEY
            ),
            Err(err) => error!(
                "event=snapshot_clear module=persistence status=error error_code=remove_failed key={} error={}",
                JOURNAL_STORAGE_KEY, err
            ),
        }
    }
}
