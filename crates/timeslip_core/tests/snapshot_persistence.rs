use chrono::{TimeDelta, TimeZone, Utc};
use std::rc::Rc;
use timeslip_core::db::{open_db, open_db_in_memory};
use timeslip_core::{
    AnomalyIntensity, JournalEntry, JournalSnapshot, KeyValueStore, MemoryKeyValueStore,
    SlotPersistence, SnapshotLoad, SnapshotPersistence, SqliteKeyValueStore, StorageError,
    StorageResult, JOURNAL_STORAGE_KEY,
};

struct UnreadableStore;

impl KeyValueStore for UnreadableStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            requested: 0,
            quota: 0,
        })
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }
}

fn sample_snapshot() -> JournalSnapshot {
    let t0 = Utc.with_ymd_and_hms(2026, 2, 13, 10, 0, 0).unwrap();
    let root = JournalEntry::authored("the attic door was open", t0);
    let echo = JournalEntry::future_echo(
        &root,
        "the ▓▓▓▓▓ door was nepo\n\n...time fractures...".to_string(),
        t0 + TimeDelta::hours(30),
        t0 + TimeDelta::minutes(2),
    );
    let branch = JournalEntry::parallel_branch(
        &root,
        "the attic door was open ...but in this branch, something changed.".to_string(),
        t0 + TimeDelta::minutes(3),
    );
    JournalSnapshot {
        selected_entry_id: Some(echo.id),
        entries: vec![root, echo, branch],
        anomaly_intensity: AnomalyIntensity::CATASTROPHIC,
        last_anomaly_at: Some(t0 + TimeDelta::minutes(3)),
    }
}

#[test]
fn memory_round_trip_is_lossless() {
    let persistence = SlotPersistence::new(MemoryKeyValueStore::new());
    let snapshot = sample_snapshot();

    persistence.save(&snapshot);

    assert_eq!(persistence.load(), Some(snapshot));
}

#[test]
fn load_is_absent_for_empty_or_malformed_slots() {
    let store = Rc::new(MemoryKeyValueStore::new());
    let persistence = SlotPersistence::new(Rc::clone(&store));
    assert_eq!(persistence.load(), None);

    for raw in [
        "",
        "not json at all",
        "null",
        "42",
        r#"{"selectedEntryId": null}"#,
        r#"{"entries": "nope"}"#,
        r#"{"entries": [{"id": "broken"}]}"#,
        r#"{"entries": [], "anomalyIntensity": 7}"#,
    ] {
        store.set(JOURNAL_STORAGE_KEY, raw).unwrap();
        assert_eq!(persistence.load(), None, "payload should be rejected: {raw}");
    }
}

#[test]
fn read_tells_vacant_slots_from_unusable_ones() {
    let store = Rc::new(MemoryKeyValueStore::new());
    let persistence = SlotPersistence::new(Rc::clone(&store));
    assert_eq!(persistence.read(), SnapshotLoad::Empty);

    store
        .set(JOURNAL_STORAGE_KEY, r#"{"entries": [{"id": "broken"}]}"#)
        .unwrap();
    assert_eq!(persistence.read(), SnapshotLoad::Rejected);

    let snapshot = sample_snapshot();
    persistence.save(&snapshot);
    assert_eq!(persistence.read(), SnapshotLoad::Loaded(snapshot));

    let unreadable = SlotPersistence::new(UnreadableStore);
    assert_eq!(unreadable.read(), SnapshotLoad::ReadFailed);
    assert_eq!(unreadable.load(), None);
}

#[test]
fn clear_removes_the_slot_only() {
    let store = Rc::new(MemoryKeyValueStore::new());
    store.set("ui-settings-storage", "{}").unwrap();
    let persistence = SlotPersistence::new(Rc::clone(&store));
    persistence.save(&sample_snapshot());

    persistence.clear();
    persistence.clear();

    assert_eq!(persistence.load(), None);
    assert_eq!(store.get("ui-settings-storage").unwrap().as_deref(), Some("{}"));
}

#[test]
fn failed_writes_are_swallowed() {
    let persistence = SlotPersistence::new(MemoryKeyValueStore::with_quota(8));

    persistence.save(&sample_snapshot());

    assert_eq!(persistence.load(), None);
}

#[test]
fn wire_format_uses_camel_case_and_rfc3339() {
    let store = Rc::new(MemoryKeyValueStore::new());
    let persistence = SlotPersistence::new(Rc::clone(&store));
    let mut snapshot = sample_snapshot();
    snapshot.last_anomaly_at = None;
    persistence.save(&snapshot);

    let raw = store.get(JOURNAL_STORAGE_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["anomalyIntensity"], 3);
    assert!(json["lastAnomalyAt"].is_null());
    assert_eq!(json["selectedEntryId"], snapshot.entries[1].id.to_string());

    let root = &json["entries"][0];
    assert_eq!(root["createdAt"], "2026-02-13T10:00:00Z");
    assert_eq!(root["anomalyType"], "none");
    assert!(root["parentId"].is_null());
    assert!(root["branchId"].is_null());
    assert_eq!(root["isRewritten"], false);

    let branch = &json["entries"][2];
    assert_eq!(branch["anomalyType"], "parallel_branch");
    assert_eq!(branch["version"], 1);
    assert!(branch["branchId"].is_string());
}

#[test]
fn accepts_snapshots_written_by_browser_clients() {
    let store = MemoryKeyValueStore::new();
    store
        .set(
            JOURNAL_STORAGE_KEY,
            r#"{
                "entries": [{
                    "id": "11111111-2222-4333-8444-555555555555",
                    "createdAt": "2026-02-13T10:00:00.000Z",
                    "apparentTime": "2026-02-13T10:00:00.000Z",
                    "content": "browser note",
                    "originalContent": "browser note",
                    "anomalyType": "none",
                    "version": 1,
                    "isRewritten": false
                }],
                "selectedEntryId": "11111111-2222-4333-8444-555555555555",
                "anomalyIntensity": 1
            }"#,
        )
        .unwrap();

    let snapshot = SlotPersistence::new(&store).load().unwrap();

    assert_eq!(snapshot.entries.len(), 1);
    assert_eq!(snapshot.entries[0].parent_id, None);
    assert_eq!(snapshot.anomaly_intensity, AnomalyIntensity::UNSETTLING);
    assert_eq!(snapshot.last_anomaly_at, None);
}

#[test]
fn sqlite_slots_round_trip_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timeslip.db");
    let snapshot = sample_snapshot();

    {
        let conn = open_db(&path).unwrap();
        SlotPersistence::new(SqliteKeyValueStore::new(&conn)).save(&snapshot);
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteKeyValueStore::new(&conn);
    assert_eq!(store.keys().unwrap(), vec![JOURNAL_STORAGE_KEY.to_string()]);
    assert_eq!(SlotPersistence::new(&store).load(), Some(snapshot));
}

#[test]
fn sqlite_store_upserts_and_removes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKeyValueStore::new(&conn);

    assert_eq!(store.get("slot").unwrap(), None);
    store.set("slot", "first").unwrap();
    store.set("slot", "second").unwrap();
    assert_eq!(store.get("slot").unwrap().as_deref(), Some("second"));

    store.remove("slot").unwrap();
    store.remove("slot").unwrap();
    assert_eq!(store.get("slot").unwrap(), None);
    assert!(store.keys().unwrap().is_empty());
}
