//! Journal entry store.
//!
//! # Responsibility
//! - Own the entry collection, selection, anomaly intensity and the last
//!   anomaly instant.
//! - Apply authored edits and time anomalies.
//! - Persist the full snapshot after every mutation.
//!
//! # Invariants
//! - Entries are only appended; the collection is never reordered or pruned
//!   except by `reset_journal`.
//! - Invalid arguments (blank text, unknown ids) are silent no-ops.
//! - Persistence is best-effort and never blocks an in-memory mutation.

use crate::model::entry::{EntryId, JournalEntry, Timestamp};
use crate::model::intensity::AnomalyIntensity;
use crate::model::snapshot::JournalSnapshot;
use crate::persistence::{SnapshotLoad, SnapshotPersistence};
use crate::temporal::{
    distort, pick_oldest_by_creation, pick_random, random_future_timestamp, Clock,
    DistortionMode, SystemClock, DEFAULT_MAX_HOURS, DEFAULT_MIN_HOURS,
};
use chrono::TimeDelta;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// First sample entry, dated one day before seeding.
pub const SAMPLE_ENTRY_YESTERDAY: &str =
    "I found this journal in the attic. The pages feel... wrong. Like they're watching me.";
/// Second sample entry, dated at seeding time.
pub const SAMPLE_ENTRY_NOW: &str =
    "The dates don't make sense. Some entries are from tomorrow. How is that possible?";

/// Why a journal opened from sample entries instead of storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedCause {
    /// Nothing was stored yet.
    EmptySlot,
    /// A valid snapshot was stored but held no entries.
    NoStoredEntries,
    /// A payload was stored but failed decoding or validation.
    Rejected,
    /// Storage could not be read.
    ReadFailed,
}

impl SeedCause {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptySlot => "empty_slot",
            Self::NoStoredEntries => "no_stored_entries",
            Self::Rejected => "rejected",
            Self::ReadFailed => "read_failed",
        }
    }

    /// Whether writing the samples back would lose no stored entries.
    pub fn slot_is_vacant(self) -> bool {
        matches!(self, Self::EmptySlot | Self::NoStoredEntries)
    }
}

/// Journal state owner.
///
/// Time and randomness are injected so anomalies can be replayed in tests.
pub struct JournalService<P, C = SystemClock, G = StdRng>
where
    P: SnapshotPersistence,
    C: Clock,
    G: Rng,
{
    persistence: P,
    clock: C,
    rng: G,
    entries: Vec<JournalEntry>,
    selected_entry_id: Option<EntryId>,
    anomaly_intensity: AnomalyIntensity,
    last_anomaly_at: Option<Timestamp>,
    seed_cause: Option<SeedCause>,
}

impl<P: SnapshotPersistence> JournalService<P> {
    /// Opens the journal with the system clock and an OS-seeded RNG.
    pub fn open(persistence: P) -> Self {
        Self::with_parts(persistence, SystemClock, StdRng::from_os_rng())
    }
}

impl<P, C, G> JournalService<P, C, G>
where
    P: SnapshotPersistence,
    C: Clock,
    G: Rng,
{
    /// Opens the journal from persisted state, seeding samples when there is
    /// nothing usable stored.
    ///
    /// Seeding does not write to storage; the first mutation does.
    pub fn with_parts(persistence: P, clock: C, rng: G) -> Self {
        let mut service = Self {
            persistence,
            clock,
            rng,
            entries: Vec::new(),
            selected_entry_id: None,
            anomaly_intensity: AnomalyIntensity::default(),
            last_anomaly_at: None,
            seed_cause: None,
        };

        let cause = match service.persistence.read() {
            SnapshotLoad::Loaded(snapshot) if !snapshot.entries.is_empty() => {
                info!(
                    "event=journal_open module=service status=ok source=storage entries={}",
                    snapshot.entries.len()
                );
                service.entries = snapshot.entries;
                service.selected_entry_id = snapshot.selected_entry_id;
                service.anomaly_intensity = snapshot.anomaly_intensity;
                service.last_anomaly_at = snapshot.last_anomaly_at;
                return service;
            }
            SnapshotLoad::Loaded(_) => SeedCause::NoStoredEntries,
            SnapshotLoad::Empty => SeedCause::EmptySlot,
            SnapshotLoad::Rejected => SeedCause::Rejected,
            SnapshotLoad::ReadFailed => SeedCause::ReadFailed,
        };
        service.seed_samples();
        service.seed_cause = Some(cause);
        info!(
            "event=journal_open module=service status=ok source=samples cause={} entries=2",
            cause.as_str()
        );
        service
    }

    /// Whether this instance started from sample entries instead of storage.
    pub fn was_seeded(&self) -> bool {
        self.seed_cause.is_some()
    }

    /// Why samples were seeded on open, or `None` when storage was adopted.
    pub fn seed_cause(&self) -> Option<SeedCause> {
        self.seed_cause
    }

    /// Entries in creation order.
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> Option<&JournalEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn selected_entry_id(&self) -> Option<EntryId> {
        self.selected_entry_id
    }

    /// Selected entry, or `None` when nothing (or an unknown id) is selected.
    pub fn selected_entry(&self) -> Option<&JournalEntry> {
        self.selected_entry_id.and_then(|id| self.entry(id))
    }

    pub fn anomaly_intensity(&self) -> AnomalyIntensity {
        self.anomaly_intensity
    }

    pub fn last_anomaly_at(&self) -> Option<Timestamp> {
        self.last_anomaly_at
    }

    /// Copy of the state exactly as it is persisted.
    pub fn snapshot(&self) -> JournalSnapshot {
        JournalSnapshot {
            entries: self.entries.clone(),
            selected_entry_id: self.selected_entry_id,
            anomaly_intensity: self.anomaly_intensity,
            last_anomaly_at: self.last_anomaly_at,
        }
    }

    /// Writes the current snapshot.
    pub fn persist(&self) {
        self.persistence.save(&self.snapshot());
    }

    /// Appends an authored entry and selects it.
    ///
    /// Blank input (after trimming) is ignored and nothing is persisted.
    pub fn add_entry(&mut self, text: &str) -> Option<EntryId> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("event=journal_add module=service status=skipped reason=blank");
            return None;
        }

        let entry = JournalEntry::authored(trimmed, self.clock.now());
        let id = entry.id;
        self.entries.push(entry);
        self.selected_entry_id = Some(id);
        info!(
            "event=journal_add module=service status=ok entry_id={} content_chars={}",
            id,
            trimmed.chars().count()
        );
        self.persist();
        Some(id)
    }

    /// Replaces the body of an existing entry with trimmed `text`.
    ///
    /// Unknown ids change nothing, but the snapshot is still written.
    /// Returns whether an entry matched.
    pub fn update_entry(&mut self, id: EntryId, text: &str) -> bool {
        let matched = match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.content = text.trim().to_string();
                true
            }
            None => false,
        };
        if matched {
            info!("event=journal_update module=service status=ok entry_id={id}");
        } else {
            debug!("event=journal_update module=service status=skipped reason=unknown_id entry_id={id}");
        }
        self.persist();
        matched
    }

    /// Sets the selection without checking that the id exists.
    pub fn select_entry(&mut self, id: Option<EntryId>) {
        self.selected_entry_id = id;
        debug!(
            "event=journal_select module=service status=ok entry_id={}",
            id.map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        self.persist();
    }

    pub fn set_anomaly_intensity(&mut self, level: AnomalyIntensity) {
        self.anomaly_intensity = level;
        info!(
            "event=journal_intensity module=service status=ok level={}",
            level.level()
        );
        self.persist();
    }

    /// Derives an anomaly entry, appends it and selects it.
    ///
    /// Returns the new entry id, or `None` when no source entry resolves
    /// (empty journal, or a selection that points at no entry).
    pub fn apply_time_anomaly(&mut self, mode: DistortionMode) -> Option<EntryId> {
        if self.entries.is_empty() {
            debug!("event=journal_anomaly module=service status=skipped reason=empty mode={mode}");
            return None;
        }

        let now = self.clock.now();
        let Some(entry) = self.derive_anomaly(mode, now) else {
            debug!(
                "event=journal_anomaly module=service status=skipped reason=no_source mode={mode}"
            );
            return None;
        };

        let id = entry.id;
        info!(
            "event=journal_anomaly module=service status=ok mode={} entry_id={} parent_id={} version={}",
            mode,
            id,
            entry
                .parent_id
                .map_or_else(|| "none".to_string(), |parent| parent.to_string()),
            entry.version
        );
        self.entries.push(entry);
        self.selected_entry_id = Some(id);
        self.last_anomaly_at = Some(now);
        self.persist();
        Some(id)
    }

    /// Discards everything and reseeds the sample entries.
    pub fn reset_journal(&mut self) {
        self.persistence.clear();
        self.seed_samples();
        self.anomaly_intensity = AnomalyIntensity::default();
        self.last_anomaly_at = None;
        info!("event=journal_reset module=service status=ok entries=2");
        self.persist();
    }

    fn derive_anomaly(&mut self, mode: DistortionMode, now: Timestamp) -> Option<JournalEntry> {
        match mode {
            DistortionMode::FutureEcho => {
                let source = match self.selected_entry_id {
                    Some(id) => self.entries.iter().find(|entry| entry.id == id),
                    None => pick_random(&mut self.rng, &self.entries),
                }?;
                let apparent_time = random_future_timestamp(
                    now,
                    &mut self.rng,
                    DEFAULT_MIN_HOURS,
                    DEFAULT_MAX_HOURS,
                )?;
                let content = distort(&source.content, mode, &mut self.rng);
                Some(JournalEntry::future_echo(source, content, apparent_time, now))
            }
            DistortionMode::AlterPast => {
                let source = pick_oldest_by_creation(&self.entries)?;
                let content = distort(&source.content, mode, &mut self.rng);
                Some(JournalEntry::altered_past(source, content, now))
            }
            DistortionMode::BranchTimeline => {
                let source = match self.selected_entry_id {
                    Some(id) => self.entries.iter().find(|entry| entry.id == id),
                    None => self.entries.last(),
                }?;
                let content = distort(&source.content, mode, &mut self.rng);
                Some(JournalEntry::parallel_branch(source, content, now))
            }
        }
    }

    fn seed_samples(&mut self) {
        let now = self.clock.now();
        let first = JournalEntry::authored(SAMPLE_ENTRY_YESTERDAY, now - TimeDelta::days(1));
        let second = JournalEntry::authored(SAMPLE_ENTRY_NOW, now);
        self.selected_entry_id = Some(first.id);
        self.entries = vec![first, second];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SlotPersistence;
    use crate::storage::{KeyValueStore, MemoryKeyValueStore};
    use crate::temporal::ManualClock;
    use chrono::{TimeZone, Utc};
    use rand_pcg::Pcg64;
    use std::rc::Rc;

    fn journal(
        store: Rc<MemoryKeyValueStore>,
    ) -> JournalService<SlotPersistence<Rc<MemoryKeyValueStore>>, ManualClock, Pcg64> {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap());
        JournalService::with_parts(SlotPersistence::new(store), clock, Pcg64::seed_from_u64(3))
    }

    #[test]
    fn anomaly_on_empty_collection_is_noop() {
        let store = Rc::new(MemoryKeyValueStore::new());
        let mut service = journal(Rc::clone(&store));
        service.entries.clear();
        service.selected_entry_id = None;

        for mode in DistortionMode::ALL {
            assert_eq!(service.apply_time_anomaly(mode), None);
        }
        assert!(service.entries().is_empty());
        assert_eq!(service.last_anomaly_at(), None);
        assert_eq!(store.get(crate::JOURNAL_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn seeding_dates_first_sample_a_day_back() {
        let service = journal(Rc::new(MemoryKeyValueStore::new()));
        let [first, second] = service.entries() else {
            panic!("expected two samples");
        };
        assert_eq!(second.created_at - first.created_at, TimeDelta::days(1));
        assert_eq!(service.selected_entry_id(), Some(first.id));
        assert!(service.was_seeded());
    }

    #[test]
    fn reset_does_not_flip_seeded_flag() {
        let store = Rc::new(MemoryKeyValueStore::new());
        let mut service = journal(Rc::clone(&store));
        service.add_entry("kept");
        let mut reopened = journal(store);
        assert!(!reopened.was_seeded());
        reopened.reset_journal();
        assert!(!reopened.was_seeded());
        assert_eq!(reopened.entries().len(), 2);
    }
}
