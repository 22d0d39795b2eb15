//! Favorite Entry Entity
//!
//! One movie in one user's favorites, with its reconciliation state.

use catalog::MovieRecord;
use chrono::{DateTime, Utc};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};

/// Kind of local mutation awaiting the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationKind {
    Add,
    Remove,
}

impl MutationKind {
    /// Membership the mutation asks for
    pub const fn desired_presence(self) -> bool {
        matches!(self, MutationKind::Add)
    }
}

/// Reconciliation state of a favorite entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "mutation", rename_all = "camelCase")]
pub enum SyncState {
    /// Applied locally, remote write outstanding
    Pending(MutationKind),
    /// Local and remote agree
    Committed,
    /// Remote write failed; local state restored to the last committed one
    RolledBack,
}

/// Favorite entry as exposed to the UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub user_id: UserId,
    pub movie: MovieRecord,
    /// Desired membership
    pub present: bool,
    pub sync: SyncState,
    pub mutated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AddOutcome {
    Added,
    /// Already a favorite; nothing was written
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RemoveOutcome {
    Removed,
    /// Not a favorite; nothing was written
    NotPresent,
}
