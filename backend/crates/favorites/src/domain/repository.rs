//! Store and Lookup Traits
//!
//! Interfaces to the remote favorites store and to the movie catalog.
//! Implementations are in the infrastructure layer.

use catalog::MovieRecord;
use kernel::id::MovieId;
use session::UserSession;

use crate::error::FavoritesResult;

/// Remote favorites store trait
///
/// Favorites are kept as full movie snapshots per user. Writes must be
/// idempotent: upserting an existing movie or deleting a missing one
/// succeeds.
#[trait_variant::make(FavoritesStore: Send)]
pub trait LocalFavoritesStore {
    /// Every favorite of the session's user
    async fn read_all(&self, session: &UserSession) -> FavoritesResult<Vec<MovieRecord>>;

    async fn upsert(&self, session: &UserSession, movie: &MovieRecord) -> FavoritesResult<()>;

    async fn delete(&self, session: &UserSession, movie_id: &MovieId) -> FavoritesResult<()>;
}

/// Movie metadata lookup trait (backed by the catalog cache)
#[trait_variant::make(MovieLookup: Send)]
pub trait LocalMovieLookup {
    /// `Ok(None)` when the catalog has no such movie
    async fn lookup(&self, id: &MovieId) -> FavoritesResult<Option<MovieRecord>>;
}
