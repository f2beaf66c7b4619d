//! Core domain logic for the Timeslip journal.
//! This crate is the single source of truth for entry and anomaly invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod service;
pub mod settings;
pub mod storage;
pub mod temporal;
pub mod view;

pub use logging::{init_logging, logging_status, LoggingError};
pub use model::entry::{
    AnomalyType, BranchId, EntryId, EntryValidationError, JournalEntry, Timestamp,
};
pub use model::intensity::{AnomalyIntensity, IntensityOutOfRange};
pub use model::snapshot::JournalSnapshot;
pub use persistence::{
    decode_snapshot, encode_snapshot, SlotPersistence, SnapshotDecodeError, SnapshotLoad,
    SnapshotPersistence, JOURNAL_STORAGE_KEY,
};
pub use service::journal_service::{JournalService, SeedCause};
pub use settings::{UiSettings, UiSettingsStore, VisualIntensity, UI_SETTINGS_STORAGE_KEY};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use temporal::{Clock, DistortionMode, DistortionModeParseError, ManualClock, SystemClock};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
