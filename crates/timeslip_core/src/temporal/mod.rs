//! Temporal utilities used to fabricate anomalies.
//!
//! # Responsibility
//! - Read "now" through an injectable clock.
//! - Generate randomized past/future instants within an hour window.
//! - Pick source entries and distort their text.
//!
//! # Invariants
//! - Every random draw goes through a caller-supplied `rand::Rng`.
//! - Text transforms never mutate their input.

pub mod clock;
pub mod distort;
pub mod time;

pub use clock::{Clock, ManualClock, SystemClock};
pub use distort::{distort, DistortionMode, DistortionModeParseError};
pub use time::{
    pick_oldest_by_creation, pick_random, random_future_timestamp, random_past_timestamp,
    DEFAULT_MAX_HOURS, DEFAULT_MIN_HOURS,
};
