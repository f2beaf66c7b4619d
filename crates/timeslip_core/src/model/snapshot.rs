//! Persisted journal snapshot.
//!
//! # Invariants
//! - `entries` keeps insertion (creation) order; display sorts never touch it.
//! - Missing optional fields decode to their defaults instead of failing.

use crate::model::entry::{EntryId, JournalEntry, Timestamp};
use crate::model::intensity::AnomalyIntensity;
use serde::{Deserialize, Serialize};

/// Full journal state as written to the storage slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalSnapshot {
    pub entries: Vec<JournalEntry>,
    #[serde(default)]
    pub selected_entry_id: Option<EntryId>,
    #[serde(default)]
    pub anomaly_intensity: AnomalyIntensity,
    #[serde(default)]
    pub last_anomaly_at: Option<Timestamp>,
}

impl JournalSnapshot {
    /// Looks up an entry by id.
    pub fn entry(&self, id: EntryId) -> Option<&JournalEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }
}
