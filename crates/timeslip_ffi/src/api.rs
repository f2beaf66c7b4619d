//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose journal and settings use-cases to Dart via FRB.
//! - Flatten domain types into string-typed envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Invalid ids, modes and levels return `ok=false` envelopes.
//! - Journal calls are serialized per process; each call is one
//!   load-mutate-save cycle against the SQLite slot store.

use log::warn;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};
use timeslip_core::db::open_db;
use timeslip_core::view::{
    branch_ids, entries_newest_first, glitch_duration_ms, lineage, timeline_order,
};
use timeslip_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AnomalyIntensity, DistortionMode, EntryId, JournalEntry, JournalService, SeedCause,
    SlotPersistence, SqliteKeyValueStore, Timestamp, UiSettings, UiSettingsStore,
    VisualIntensity,
};

const JOURNAL_DB_FILE_NAME: &str = "timeslip_journal.sqlite3";
static JOURNAL_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static JOURNAL_LOCK: Mutex<()> = Mutex::new(());

type SqliteJournal<'conn> = JournalService<SlotPersistence<SqliteKeyValueStore<'conn>>>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Flattened journal entry for UI rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntryView {
    pub id: String,
    /// RFC 3339 creation instant.
    pub created_at: String,
    /// RFC 3339 instant the entry claims to be from.
    pub apparent_time: String,
    pub content: String,
    pub original_content: String,
    /// Wire name (`none|future|altered_past|parallel_branch`).
    pub anomaly_type: String,
    /// Legend label, e.g. `Future Echo`.
    pub anomaly_label: String,
    /// Glyph shown beside anomalous timestamps.
    pub anomaly_marker: Option<String>,
    /// Whether `content` no longer matches `original_content`.
    pub has_drifted: bool,
    pub parent_id: Option<String>,
    pub branch_id: Option<String>,
    pub version: u32,
    pub is_rewritten: bool,
}

/// Full journal state envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalStateResponse {
    pub ok: bool,
    /// Entries in creation order.
    pub entries: Vec<JournalEntryView>,
    pub selected_entry_id: Option<String>,
    pub anomaly_intensity: u8,
    pub anomaly_intensity_label: String,
    pub last_anomaly_at: Option<String>,
    /// Glitch animation length for the current intensity.
    pub glitch_duration_ms: u64,
    /// Entry ids by apparent time, latest first (list view).
    pub newest_first_ids: Vec<String>,
    /// Entry ids by apparent time, earliest first (timeline view).
    pub timeline_ids: Vec<String>,
    /// Distinct branch ids in order of first appearance.
    pub branch_ids: Vec<String>,
    /// Selected entry followed by its ancestors up to the root.
    pub selected_lineage_ids: Vec<String>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

impl JournalStateResponse {
    fn failure(message: impl Into<String>) -> Self {
        let intensity = AnomalyIntensity::default();
        Self {
            ok: false,
            entries: Vec::new(),
            selected_entry_id: None,
            anomaly_intensity: intensity.level(),
            anomaly_intensity_label: intensity.label().to_string(),
            last_anomaly_at: None,
            glitch_duration_ms: glitch_duration_ms(intensity),
            newest_first_ids: Vec::new(),
            timeline_ids: Vec::new(),
            branch_ids: Vec::new(),
            selected_lineage_ids: Vec::new(),
            message: message.into(),
        }
    }
}

/// Generic action response envelope for journal commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalActionResponse {
    /// Whether the command changed journal state as requested.
    pub ok: bool,
    /// Entry created or touched by the command.
    pub entry_id: Option<String>,
    pub message: String,
}

impl JournalActionResponse {
    fn success(message: impl Into<String>, entry_id: Option<EntryId>) -> Self {
        Self {
            ok: true,
            entry_id: entry_id.map(|id| id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            entry_id: None,
            message: message.into(),
        }
    }
}

/// UI preferences envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiSettingsResponse {
    pub ok: bool,
    /// `low|medium|high`.
    pub visual_intensity: String,
    pub glitch_enabled: bool,
    pub ambient_mode: bool,
    /// Effective glitch level (0 when glitches are disabled).
    pub glitch_level: u8,
    pub message: String,
}

impl UiSettingsResponse {
    fn from_settings(settings: UiSettings, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            visual_intensity: settings.visual_intensity.as_str().to_string(),
            glitch_enabled: settings.glitch_enabled,
            ambient_mode: settings.ambient_mode,
            glitch_level: settings.effective_glitch_level(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            ..Self::from_settings(UiSettings::default(), message)
        }
    }
}

/// Returns the full journal state, seeding samples on first use.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_state() -> JournalStateResponse {
    journal_state_at(&resolve_journal_db_path())
}

/// Appends an authored entry; blank text is rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_add_entry(text: String) -> JournalActionResponse {
    journal_add_entry_at(&resolve_journal_db_path(), &text)
}

/// Replaces the body of an existing entry.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_update_entry(entry_id: String, text: String) -> JournalActionResponse {
    journal_update_entry_at(&resolve_journal_db_path(), &entry_id, &text)
}

/// Selects an entry, or clears the selection when `entry_id` is `None`.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_select_entry(entry_id: Option<String>) -> JournalActionResponse {
    journal_select_entry_at(&resolve_journal_db_path(), entry_id.as_deref())
}

/// Sets the anomaly intensity (0..=3).
#[flutter_rust_bridge::frb(sync)]
pub fn journal_set_anomaly_intensity(level: u8) -> JournalActionResponse {
    journal_set_anomaly_intensity_at(&resolve_journal_db_path(), level)
}

/// Applies one time anomaly.
///
/// Input semantics:
/// - `mode`: one of `future_echo|alter_past|branch_timeline`.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_apply_anomaly(mode: String) -> JournalActionResponse {
    journal_apply_anomaly_at(&resolve_journal_db_path(), &mode)
}

/// Discards all entries and reseeds the samples.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_reset() -> JournalActionResponse {
    journal_reset_at(&resolve_journal_db_path())
}

/// Returns stored UI preferences, or defaults.
#[flutter_rust_bridge::frb(sync)]
pub fn ui_settings_get() -> UiSettingsResponse {
    with_settings_at(&resolve_journal_db_path(), |_| "Loaded.")
}

/// Input semantics:
/// - `level`: one of `low|medium|high` (case-insensitive).
#[flutter_rust_bridge::frb(sync)]
pub fn ui_settings_set_visual_intensity(level: String) -> UiSettingsResponse {
    ui_settings_set_visual_intensity_at(&resolve_journal_db_path(), &level)
}

#[flutter_rust_bridge::frb(sync)]
pub fn ui_settings_set_glitch_enabled(enabled: bool) -> UiSettingsResponse {
    with_settings_at(&resolve_journal_db_path(), |store| {
        store.set_glitch_enabled(enabled);
        "Glitch effects updated."
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn ui_settings_set_ambient_mode(enabled: bool) -> UiSettingsResponse {
    with_settings_at(&resolve_journal_db_path(), |store| {
        store.set_ambient_mode(enabled);
        "Ambient mode updated."
    })
}

fn journal_state_at(db_path: &Path) -> JournalStateResponse {
    match with_journal_at(db_path, |journal| to_state_response(journal)) {
        Ok(response) => response,
        Err(err) => JournalStateResponse::failure(format!("journal_state failed: {err}")),
    }
}

fn journal_add_entry_at(db_path: &Path, text: &str) -> JournalActionResponse {
    match with_journal_at(db_path, |journal| journal.add_entry(text)) {
        Ok(Some(id)) => JournalActionResponse::success("Entry added.", Some(id)),
        Ok(None) => JournalActionResponse::failure("Entry text is empty."),
        Err(err) => JournalActionResponse::failure(format!("journal_add_entry failed: {err}")),
    }
}

fn journal_update_entry_at(db_path: &Path, entry_id: &str, text: &str) -> JournalActionResponse {
    let id = match parse_entry_id(entry_id) {
        Ok(id) => id,
        Err(message) => return JournalActionResponse::failure(message),
    };
    match with_journal_at(db_path, |journal| journal.update_entry(id, text)) {
        Ok(true) => JournalActionResponse::success("Entry updated.", Some(id)),
        Ok(false) => JournalActionResponse::failure(format!("entry not found: {id}")),
        Err(err) => JournalActionResponse::failure(format!("journal_update_entry failed: {err}")),
    }
}

fn journal_select_entry_at(db_path: &Path, entry_id: Option<&str>) -> JournalActionResponse {
    let id = match entry_id.map(parse_entry_id).transpose() {
        Ok(id) => id,
        Err(message) => return JournalActionResponse::failure(message),
    };
    match with_journal_at(db_path, |journal| journal.select_entry(id)) {
        Ok(()) => JournalActionResponse::success("Selection updated.", id),
        Err(err) => JournalActionResponse::failure(format!("journal_select_entry failed: {err}")),
    }
}

fn journal_set_anomaly_intensity_at(db_path: &Path, level: u8) -> JournalActionResponse {
    let intensity = match AnomalyIntensity::try_from(level) {
        Ok(intensity) => intensity,
        Err(err) => return JournalActionResponse::failure(err.to_string()),
    };
    match with_journal_at(db_path, |journal| journal.set_anomaly_intensity(intensity)) {
        Ok(()) => JournalActionResponse::success(
            format!("Anomaly intensity set to {}.", intensity.label()),
            None,
        ),
        Err(err) => {
            JournalActionResponse::failure(format!("journal_set_anomaly_intensity failed: {err}"))
        }
    }
}

fn journal_apply_anomaly_at(db_path: &Path, mode: &str) -> JournalActionResponse {
    let mode = match mode.trim().parse::<DistortionMode>() {
        Ok(mode) => mode,
        Err(err) => return JournalActionResponse::failure(err.to_string()),
    };
    match with_journal_at(db_path, |journal| journal.apply_time_anomaly(mode)) {
        Ok(Some(id)) => JournalActionResponse::success(format!("Anomaly {mode} applied."), Some(id)),
        Ok(None) => JournalActionResponse::failure("No source entry for anomaly."),
        Err(err) => JournalActionResponse::failure(format!("journal_apply_anomaly failed: {err}")),
    }
}

fn journal_reset_at(db_path: &Path) -> JournalActionResponse {
    match with_journal_at(db_path, |journal| {
        journal.reset_journal();
        journal.selected_entry_id()
    }) {
        Ok(selected) => JournalActionResponse::success("Journal reset.", selected),
        Err(err) => JournalActionResponse::failure(format!("journal_reset failed: {err}")),
    }
}

fn ui_settings_set_visual_intensity_at(db_path: &Path, level: &str) -> UiSettingsResponse {
    let level = match level.parse::<VisualIntensity>() {
        Ok(level) => level,
        Err(err) => return UiSettingsResponse::failure(err.to_string()),
    };
    with_settings_at(db_path, |store| {
        store.set_visual_intensity(level);
        "Visual intensity updated."
    })
}

fn resolve_journal_db_path() -> PathBuf {
    JOURNAL_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("TIMESLIP_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(JOURNAL_DB_FILE_NAME)
        })
        .clone()
}

fn with_journal_at<T>(
    db_path: &Path,
    f: impl FnOnce(&mut SqliteJournal<'_>) -> T,
) -> Result<T, String> {
    let _guard = JOURNAL_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let conn = open_db(db_path).map_err(|err| format!("journal DB open failed: {err}"))?;
    let mut journal = JournalService::open(SlotPersistence::new(SqliteKeyValueStore::new(&conn)));
    // Samples get fresh ids on every open; store them so ids stay stable
    // between calls. A slot holding unusable data is left for a mutation to
    // replace.
    if journal.seed_cause().is_some_and(SeedCause::slot_is_vacant) {
        journal.persist();
    }
    Ok(f(&mut journal))
}

fn with_settings_at(
    db_path: &Path,
    f: impl FnOnce(&mut UiSettingsStore<SqliteKeyValueStore<'_>>) -> &'static str,
) -> UiSettingsResponse {
    let _guard = JOURNAL_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let conn = match open_db(db_path) {
        Ok(conn) => conn,
        Err(err) => {
            warn!("event=ffi_settings module=ffi status=error error_code=db_open_failed error={err}");
            return UiSettingsResponse::failure(format!("settings DB open failed: {err}"));
        }
    };
    let mut store = UiSettingsStore::load(SqliteKeyValueStore::new(&conn));
    let message = f(&mut store);
    UiSettingsResponse::from_settings(store.settings(), message)
}

fn parse_entry_id(raw: &str) -> Result<EntryId, String> {
    EntryId::parse_str(raw.trim()).map_err(|err| format!("invalid entry id `{raw}`: {err}"))
}

fn to_state_response(journal: &SqliteJournal<'_>) -> JournalStateResponse {
    let intensity = journal.anomaly_intensity();
    let entries = journal.entries();
    let message = match journal.seed_cause() {
        Some(cause) if !cause.slot_is_vacant() => format!(
            "Stored journal unreadable ({}); showing sample entries.",
            cause.as_str()
        ),
        _ => format!("Loaded {} entries.", entries.len()),
    };
    JournalStateResponse {
        ok: true,
        entries: entries.iter().map(to_entry_view).collect(),
        selected_entry_id: journal.selected_entry_id().map(|id| id.to_string()),
        anomaly_intensity: intensity.level(),
        anomaly_intensity_label: intensity.label().to_string(),
        last_anomaly_at: journal.last_anomaly_at().map(format_timestamp),
        glitch_duration_ms: glitch_duration_ms(intensity),
        newest_first_ids: entry_ids(entries_newest_first(entries)),
        timeline_ids: entry_ids(timeline_order(entries)),
        branch_ids: branch_ids(entries)
            .into_iter()
            .map(|id| id.to_string())
            .collect(),
        selected_lineage_ids: journal
            .selected_entry_id()
            .map(|id| entry_ids(lineage(entries, id)))
            .unwrap_or_default(),
        message,
    }
}

fn entry_ids(entries: Vec<&JournalEntry>) -> Vec<String> {
    entries.into_iter().map(|entry| entry.id.to_string()).collect()
}

fn to_entry_view(entry: &JournalEntry) -> JournalEntryView {
    JournalEntryView {
        id: entry.id.to_string(),
        created_at: format_timestamp(entry.created_at),
        apparent_time: format_timestamp(entry.apparent_time),
        content: entry.content.clone(),
        original_content: entry.original_content.clone(),
        anomaly_type: entry.anomaly_type.as_str().to_string(),
        anomaly_label: entry.anomaly_type.label().to_string(),
        anomaly_marker: entry.anomaly_type.marker().map(String::from),
        has_drifted: entry.has_drifted(),
        parent_id: entry.parent_id.map(|id| id.to_string()),
        branch_id: entry.branch_id.map(|id| id.to_string()),
        version: entry.version,
        is_rewritten: entry.is_rewritten,
    }
}

fn format_timestamp(at: Timestamp) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use tempfile::TempDir;
    use timeslip_core::{
        encode_snapshot, JournalSnapshot, KeyValueStore, JOURNAL_STORAGE_KEY,
    };

    fn scratch_db() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.sqlite3");
        (dir, path)
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn state_seeds_samples_with_stable_ids() {
        let (_dir, path) = scratch_db();
        let first = journal_state_at(&path);
        let second = journal_state_at(&path);

        assert!(first.ok, "{}", first.message);
        assert_eq!(first.entries.len(), 2);
        assert_eq!(first.entries, second.entries);
        assert_eq!(first.selected_entry_id, Some(first.entries[0].id.clone()));
        assert_eq!(first.anomaly_intensity, 2);
        assert_eq!(first.anomaly_intensity_label, "Unstable");
        assert_eq!(first.last_anomaly_at, None);
    }

    #[test]
    fn add_then_anomaly_round_trips_through_sqlite() {
        let (_dir, path) = scratch_db();
        let added = journal_add_entry_at(&path, "  the clock ticked backwards.  ");
        assert!(added.ok, "{}", added.message);

        let echo = journal_apply_anomaly_at(&path, "future_echo");
        assert!(echo.ok, "{}", echo.message);

        let state = journal_state_at(&path);
        assert_eq!(state.entries.len(), 4);
        let echo_view = state.entries.last().unwrap();
        assert_eq!(Some(echo_view.id.clone()), echo.entry_id);
        assert_eq!(echo_view.anomaly_type, "future");
        assert_eq!(echo_view.anomaly_label, "Future Echo");
        assert_eq!(echo_view.anomaly_marker.as_deref(), Some("⚡"));
        assert!(echo_view.has_drifted);
        assert_eq!(state.entries[2].anomaly_marker, None);
        assert_eq!(echo_view.parent_id, added.entry_id);
        assert_eq!(echo_view.original_content, "the clock ticked backwards.");
        assert_eq!(state.selected_entry_id, echo.entry_id);
        assert!(state.last_anomaly_at.is_some());
    }

    #[test]
    fn invalid_arguments_return_failure_envelopes() {
        let (_dir, path) = scratch_db();

        assert!(!journal_add_entry_at(&path, "   ").ok);
        assert!(!journal_apply_anomaly_at(&path, "sideways").ok);
        assert!(!journal_set_anomaly_intensity_at(&path, 4).ok);
        assert!(!journal_update_entry_at(&path, "not-a-uuid", "x").ok);
        assert!(!journal_select_entry_at(&path, Some("nope")).ok);

        let missing = journal_update_entry_at(&path, &uuid::Uuid::new_v4().to_string(), "x");
        assert!(!missing.ok);
        assert!(missing.message.contains("not found"));
        assert_eq!(journal_state_at(&path).entries.len(), 2);
    }

    #[test]
    fn selection_and_intensity_persist() {
        let (_dir, path) = scratch_db();
        assert!(journal_select_entry_at(&path, None).ok);
        assert!(journal_set_anomaly_intensity_at(&path, 3).ok);

        let state = journal_state_at(&path);
        assert_eq!(state.selected_entry_id, None);
        assert_eq!(state.anomaly_intensity, 3);
        assert_eq!(state.glitch_duration_ms, glitch_duration_ms(AnomalyIntensity::CATASTROPHIC));
    }

    #[test]
    fn reset_restores_two_samples() {
        let (_dir, path) = scratch_db();
        journal_add_entry_at(&path, "extra");
        journal_apply_anomaly_at(&path, "branch_timeline");
        journal_set_anomaly_intensity_at(&path, 0);

        let reset = journal_reset_at(&path);
        assert!(reset.ok, "{}", reset.message);

        let state = journal_state_at(&path);
        assert_eq!(state.entries.len(), 2);
        assert!(state.entries.iter().all(|entry| entry.anomaly_type == "none"));
        assert_eq!(state.anomaly_intensity, 2);
        assert_eq!(state.last_anomaly_at, None);
        assert_eq!(state.selected_entry_id, reset.entry_id);
    }

    #[test]
    fn settings_default_and_update() {
        let (_dir, path) = scratch_db();
        let defaults = with_settings_at(&path, |_| "Loaded.");
        assert!(defaults.ok);
        assert_eq!(defaults.visual_intensity, "medium");
        assert!(defaults.glitch_enabled);
        assert!(defaults.ambient_mode);

        let updated = ui_settings_set_visual_intensity_at(&path, "HIGH");
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(updated.glitch_level, 3);

        let disabled = with_settings_at(&path, |store| {
            store.set_glitch_enabled(false);
            "Glitch effects updated."
        });
        assert_eq!(disabled.glitch_level, 0);
        assert_eq!(disabled.visual_intensity, "high");

        assert!(!ui_settings_set_visual_intensity_at(&path, "extreme").ok);
    }

    #[test]
    fn read_leaves_rejected_slot_untouched() {
        let (_dir, path) = scratch_db();
        let t0 = Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap();
        let keeper = JournalEntry::authored("my precious note", t0);
        let mut stray = JournalEntry::authored("stray", t0 + TimeDelta::minutes(1));
        stray.parent_id = Some(keeper.id);
        let raw = encode_snapshot(&JournalSnapshot {
            entries: vec![keeper, stray],
            selected_entry_id: None,
            anomaly_intensity: AnomalyIntensity::default(),
            last_anomaly_at: None,
        })
        .unwrap();
        {
            let conn = open_db(&path).unwrap();
            SqliteKeyValueStore::new(&conn)
                .set(JOURNAL_STORAGE_KEY, &raw)
                .unwrap();
        }

        let first = journal_state_at(&path);
        let second = journal_state_at(&path);
        assert!(first.ok);
        assert_eq!(first.entries.len(), 2);
        assert!(first.message.contains("unreadable"), "{}", first.message);
        assert_ne!(first.entries[0].id, second.entries[0].id);

        let conn = open_db(&path).unwrap();
        let stored = SqliteKeyValueStore::new(&conn)
            .get(JOURNAL_STORAGE_KEY)
            .unwrap();
        assert_eq!(stored.as_deref(), Some(raw.as_str()));
    }

    #[test]
    fn state_exposes_view_orderings() {
        let (_dir, path) = scratch_db();
        let added = journal_add_entry_at(&path, "One. Two. Three. Four.");
        let branch = journal_apply_anomaly_at(&path, "branch_timeline");
        assert!(branch.ok, "{}", branch.message);

        let state = journal_state_at(&path);
        let by_creation: Vec<String> = state.entries.iter().map(|entry| entry.id.clone()).collect();
        // Sample one is a day old; the others share "now" and keep creation order.
        assert_eq!(state.timeline_ids, by_creation);
        assert_eq!(state.newest_first_ids.last(), Some(&by_creation[0]));
        assert_eq!(state.branch_ids.len(), 1);
        assert_eq!(
            Some(&state.branch_ids[0]),
            state.entries.last().unwrap().branch_id.as_ref()
        );
        assert_eq!(
            state.selected_lineage_ids,
            vec![branch.entry_id.unwrap(), added.entry_id.unwrap()]
        );
    }
}
