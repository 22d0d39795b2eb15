//! API DTOs (Data Transfer Objects)

use catalog::MovieRecord;
use kernel::id::MovieId;
use serde::Serialize;
use session::SessionEpoch;

use crate::domain::entity::favorite::{AddOutcome, FavoriteEntry, RemoveOutcome};

// ============================================================================
// Listing
// ============================================================================

/// Favorites list response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesResponse {
    pub epoch: SessionEpoch,
    pub favorites: Vec<MovieRecord>,
}

/// Favorites entries response (with sync state)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntriesResponse {
    pub epoch: SessionEpoch,
    pub entries: Vec<FavoriteEntry>,
}

// ============================================================================
// Mutations
// ============================================================================

/// Add response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddResponse {
    pub movie_id: MovieId,
    pub outcome: AddOutcome,
}

/// Remove response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveResponse {
    pub movie_id: MovieId,
    pub outcome: RemoveOutcome,
}
