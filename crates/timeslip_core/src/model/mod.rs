//! Journal domain model.
//!
//! # Responsibility
//! - Define the canonical entry record shared by authored notes and anomalies.
//! - Define the persisted snapshot shape of the whole journal.
//!
//! # Invariants
//! - Every entry is identified by a stable `EntryId` that is never reused.
//! - Entries are never deleted; derived entries point back through `parent_id`.

pub mod entry;
pub mod intensity;
pub mod snapshot;
