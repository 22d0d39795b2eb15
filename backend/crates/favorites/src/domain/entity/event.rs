//! Favorites Events
//!
//! Broadcast to UI subscribers. Every event carries the epoch it belongs to
//! so a consumer can ignore stragglers from a previous session.

use kernel::id::{MovieId, UserId};
use serde::Serialize;
use session::SessionEpoch;

use crate::domain::entity::favorite::MutationKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FavoritesEvent {
    /// Local set cleared for a new epoch (`user_id` is None when signed out)
    #[serde(rename_all = "camelCase")]
    Reset {
        epoch: SessionEpoch,
        user_id: Option<UserId>,
    },
    /// Remote set loaded for the epoch
    #[serde(rename_all = "camelCase")]
    Loaded { epoch: SessionEpoch, count: usize },
    #[serde(rename_all = "camelCase")]
    Added { epoch: SessionEpoch, movie_id: MovieId },
    #[serde(rename_all = "camelCase")]
    Removed { epoch: SessionEpoch, movie_id: MovieId },
    #[serde(rename_all = "camelCase")]
    Committed {
        epoch: SessionEpoch,
        movie_id: MovieId,
        mutation: MutationKind,
    },
    #[serde(rename_all = "camelCase")]
    RolledBack {
        epoch: SessionEpoch,
        movie_id: MovieId,
        mutation: MutationKind,
    },
}

impl FavoritesEvent {
    pub fn epoch(&self) -> SessionEpoch {
        match self {
            FavoritesEvent::Reset { epoch, .. }
            | FavoritesEvent::Loaded { epoch, .. }
            | FavoritesEvent::Added { epoch, .. }
            | FavoritesEvent::Removed { epoch, .. }
            | FavoritesEvent::Committed { epoch, .. }
            | FavoritesEvent::RolledBack { epoch, .. } => *epoch,
        }
    }

    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            FavoritesEvent::Reset { .. } => "reset",
            FavoritesEvent::Loaded { .. } => "loaded",
            FavoritesEvent::Added { .. } => "added",
            FavoritesEvent::Removed { .. } => "removed",
            FavoritesEvent::Committed { .. } => "committed",
            FavoritesEvent::RolledBack { .. } => "rolledBack",
        }
    }
}
