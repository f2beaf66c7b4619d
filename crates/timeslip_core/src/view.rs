//! Derived, non-persisted projections of journal entries.
//!
//! Sorting here never reorders the stored collection; every function returns
//! borrowed views.

use crate::model::entry::{BranchId, EntryId, JournalEntry};
use crate::model::intensity::AnomalyIntensity;
use std::collections::HashSet;

const GLITCH_BASE_MS: u64 = 300;
const GLITCH_STEP_MS: u64 = 90;

/// List order: latest apparent time first. Ties keep creation order.
pub fn entries_newest_first(entries: &[JournalEntry]) -> Vec<&JournalEntry> {
    let mut sorted: Vec<&JournalEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.apparent_time.cmp(&a.apparent_time));
    sorted
}

/// Timeline order: earliest apparent time first. Ties keep creation order.
pub fn timeline_order(entries: &[JournalEntry]) -> Vec<&JournalEntry> {
    let mut sorted: Vec<&JournalEntry> = entries.iter().collect();
    sorted.sort_by_key(|entry| entry.apparent_time);
    sorted
}

/// Distinct branch ids in order of first appearance.
pub fn branch_ids(entries: &[JournalEntry]) -> Vec<BranchId> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(|entry| entry.branch_id)
        .filter(|branch_id| seen.insert(*branch_id))
        .collect()
}

/// Walks `parent_id` links from `id` up to its root, starting with `id`.
///
/// Stops at the first unknown parent or repeated id.
pub fn lineage(entries: &[JournalEntry], id: EntryId) -> Vec<&JournalEntry> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        if !visited.insert(current) {
            break;
        }
        let Some(entry) = entries.iter().find(|entry| entry.id == current) else {
            break;
        };
        chain.push(entry);
        cursor = entry.parent_id;
    }
    chain
}

/// How long the glitch overlay runs after an anomaly at this intensity.
pub fn glitch_duration_ms(intensity: AnomalyIntensity) -> u64 {
    GLITCH_BASE_MS + GLITCH_STEP_MS * u64::from(intensity.level())
}
