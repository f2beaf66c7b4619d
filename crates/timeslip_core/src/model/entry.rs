//! Journal entry domain model.
//!
//! # Responsibility
//! - Define the record for authored entries and the three anomaly kinds.
//! - Provide derivation constructors so anomaly fields are always set together.
//!
//! # Invariants
//! - `id` is stable and never reused for another entry.
//! - `original_content` is captured once and never rewritten.
//! - `version >= 1`.
//! - `branch_id` is set only for `AnomalyType::ParallelBranch`.
//! - `is_rewritten` is true only for `AnomalyType::AlteredPast`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a journal entry.
pub type EntryId = Uuid;

/// Identifier shared by the entries of one parallel branch.
pub type BranchId = Uuid;

/// Wall-clock instant, serialized as an RFC 3339 string.
pub type Timestamp = DateTime<Utc>;

/// How an entry came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    /// Written by the user (or seeded as a sample).
    None,
    /// Echo that claims to come from a later point in time.
    Future,
    /// Rewrite of the oldest entry that supersedes history.
    AlteredPast,
    /// Fork of an entry into a fresh timeline branch.
    ParallelBranch,
}

impl AnomalyType {
    /// Wire name used in persisted snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Future => "future",
            Self::AlteredPast => "altered_past",
            Self::ParallelBranch => "parallel_branch",
        }
    }

    /// Human-readable label for legends and panels.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Normal",
            Self::Future => "Future Echo",
            Self::AlteredPast => "Altered Past",
            Self::ParallelBranch => "Branch",
        }
    }

    /// Single-glyph marker shown next to anomalous timestamps.
    pub fn marker(self) -> Option<char> {
        match self {
            Self::None => None,
            Self::Future => Some('⚡'),
            Self::AlteredPast => Some('⚠'),
            Self::ParallelBranch => Some('⑂'),
        }
    }

    pub fn is_anomaly(self) -> bool {
        self != Self::None
    }
}

/// Validation failures for entries read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    /// `version` must start at 1.
    InvalidVersion { id: EntryId, version: u32 },
    /// Branch entries must carry a branch id.
    MissingBranch(EntryId),
    /// Only branch entries may carry a branch id.
    UnexpectedBranch(EntryId),
    /// Anomalies must point at the entry they were derived from.
    MissingParent(EntryId),
    /// Authored entries have no parent.
    UnexpectedParent(EntryId),
    /// `is_rewritten` disagrees with `anomaly_type`.
    RewriteFlagMismatch(EntryId),
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidVersion { id, version } => {
                write!(f, "entry {id} has invalid version {version}; expected >= 1")
            }
            Self::MissingBranch(id) => write!(f, "branch entry {id} has no branch_id"),
            Self::UnexpectedBranch(id) => {
                write!(f, "entry {id} carries a branch_id but is not a branch")
            }
            Self::MissingParent(id) => write!(f, "anomaly entry {id} has no parent_id"),
            Self::UnexpectedParent(id) => write!(f, "authored entry {id} has a parent_id"),
            Self::RewriteFlagMismatch(id) => {
                write!(f, "entry {id} has is_rewritten inconsistent with its anomaly type")
            }
        }
    }
}

impl Error for EntryValidationError {}

/// One journal note, authored or anomalous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: EntryId,
    /// Real creation instant; drives age ordering.
    pub created_at: Timestamp,
    /// Instant the entry claims to be from.
    pub apparent_time: Timestamp,
    pub content: String,
    /// Body captured at creation, rendered as the "ghost" of the entry.
    pub original_content: String,
    pub anomaly_type: AnomalyType,
    #[serde(default)]
    pub parent_id: Option<EntryId>,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    pub version: u32,
    pub is_rewritten: bool,
}

impl JournalEntry {
    /// Creates a user-authored entry stamped at `now`.
    pub fn authored(content: impl Into<String>, now: Timestamp) -> Self {
        let content = content.into();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            apparent_time: now,
            original_content: content.clone(),
            content,
            anomaly_type: AnomalyType::None,
            parent_id: None,
            branch_id: None,
            version: 1,
            is_rewritten: false,
        }
    }

    /// Derives a future echo of `source` that claims to be from `apparent_time`.
    pub fn future_echo(
        source: &JournalEntry,
        content: String,
        apparent_time: Timestamp,
        now: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            apparent_time,
            content,
            original_content: source.content.clone(),
            anomaly_type: AnomalyType::Future,
            parent_id: Some(source.id),
            branch_id: None,
            version: source.version.saturating_add(1),
            is_rewritten: false,
        }
    }

    /// Derives a rewrite of `source` placed at the same point in the timeline.
    ///
    /// The parent collapses to the root of a rewrite chain, so repeated
    /// rewrites all point at the original entry.
    pub fn altered_past(source: &JournalEntry, content: String, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            apparent_time: source.apparent_time,
            content,
            original_content: source.content.clone(),
            anomaly_type: AnomalyType::AlteredPast,
            parent_id: Some(source.parent_id.unwrap_or(source.id)),
            branch_id: None,
            version: source.version.saturating_add(1),
            is_rewritten: true,
        }
    }

    /// Forks `source` into a brand new branch.
    pub fn parallel_branch(source: &JournalEntry, content: String, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            apparent_time: now,
            content,
            original_content: source.content.clone(),
            anomaly_type: AnomalyType::ParallelBranch,
            parent_id: Some(source.id),
            branch_id: Some(Uuid::new_v4()),
            version: 1,
            is_rewritten: false,
        }
    }

    /// Whether the current body no longer matches what was first written.
    pub fn has_drifted(&self) -> bool {
        self.content != self.original_content
    }

    /// Checks structural consistency of anomaly fields.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.version == 0 {
            return Err(EntryValidationError::InvalidVersion {
                id: self.id,
                version: self.version,
            });
        }

        match (self.anomaly_type, self.branch_id) {
            (AnomalyType::ParallelBranch, None) => {
                return Err(EntryValidationError::MissingBranch(self.id))
            }
            (AnomalyType::ParallelBranch, Some(_)) | (_, None) => {}
            (_, Some(_)) => return Err(EntryValidationError::UnexpectedBranch(self.id)),
        }

        match (self.anomaly_type.is_anomaly(), self.parent_id) {
            (true, None) => return Err(EntryValidationError::MissingParent(self.id)),
            (false, Some(_)) => return Err(EntryValidationError::UnexpectedParent(self.id)),
            _ => {}
        }

        if self.is_rewritten != (self.anomaly_type == AnomalyType::AlteredPast) {
            return Err(EntryValidationError::RewriteFlagMismatch(self.id));
        }

        Ok(())
    }
}
