//! Randomized instants and collection picks.

use crate::model::entry::{JournalEntry, Timestamp};
use chrono::TimeDelta;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Lower bound of the default anomaly window, in hours.
pub const DEFAULT_MIN_HOURS: f64 = 1.0;
/// Exclusive upper bound of the default anomaly window, in hours.
pub const DEFAULT_MAX_HOURS: f64 = 168.0;

const MILLIS_PER_HOUR: f64 = 60.0 * 60.0 * 1000.0;

/// Returns `now` plus a uniform offset in `[min_hours, max_hours)`.
///
/// `None` when a bound is not finite or the result leaves chrono's range.
pub fn random_future_timestamp<R: Rng + ?Sized>(
    now: Timestamp,
    rng: &mut R,
    min_hours: f64,
    max_hours: f64,
) -> Option<Timestamp> {
    now.checked_add_signed(random_offset(rng, min_hours, max_hours)?)
}

/// Returns `now` minus a uniform offset in `[min_hours, max_hours)`.
///
/// `None` when a bound is not finite or the result leaves chrono's range.
pub fn random_past_timestamp<R: Rng + ?Sized>(
    now: Timestamp,
    rng: &mut R,
    min_hours: f64,
    max_hours: f64,
) -> Option<Timestamp> {
    now.checked_sub_signed(random_offset(rng, min_hours, max_hours)?)
}

fn random_offset<R: Rng + ?Sized>(
    rng: &mut R,
    min_hours: f64,
    max_hours: f64,
) -> Option<TimeDelta> {
    if !min_hours.is_finite() || !max_hours.is_finite() {
        return None;
    }
    let low = min_hours.max(0.0);
    // A degenerate window collapses to its lower bound.
    let hours = if max_hours > low {
        rng.random_range(low..max_hours)
    } else {
        low
    };
    let millis = (hours * MILLIS_PER_HOUR).floor();
    if millis >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64)
}

/// Uniformly picks one element, or `None` for an empty slice.
pub fn pick_random<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

/// Returns the entry with the earliest `created_at`.
///
/// Ties resolve to the first entry in iteration order.
pub fn pick_oldest_by_creation(entries: &[JournalEntry]) -> Option<&JournalEntry> {
    entries.iter().min_by_key(|entry| entry.created_at)
}
