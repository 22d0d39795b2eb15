//! Store selection
//!
//! The REST store when `FAVORITES_STORE_URL` is set, the in-memory store
//! otherwise.

use catalog::MovieRecord;
use kernel::id::MovieId;
use session::UserSession;

use crate::application::config::FavoritesConfig;
use crate::domain::repository::FavoritesStore;
use crate::error::FavoritesResult;
use crate::infra::memory::InMemoryFavoritesStore;
use crate::infra::rest::RestFavoritesStore;

#[derive(Debug)]
pub enum FavoritesBackend {
    Memory(InMemoryFavoritesStore),
    Rest(RestFavoritesStore),
}

impl FavoritesBackend {
    pub fn from_config(config: &FavoritesConfig) -> FavoritesResult<Self> {
        match config.store_url.as_deref() {
            Some(url) => {
                tracing::info!(url, "Using REST favorites store");
                Ok(Self::Rest(RestFavoritesStore::new(url, &config.http)?))
            }
            None => {
                tracing::info!("FAVORITES_STORE_URL not set; using in-memory favorites store");
                Ok(Self::Memory(InMemoryFavoritesStore::new()))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Rest(_) => "rest",
        }
    }
}

impl FavoritesStore for FavoritesBackend {
    async fn read_all(&self, session: &UserSession) -> FavoritesResult<Vec<MovieRecord>> {
        match self {
            Self::Memory(store) => store.read_all(session).await,
            Self::Rest(store) => store.read_all(session).await,
        }
    }

    async fn upsert(&self, session: &UserSession, movie: &MovieRecord) -> FavoritesResult<()> {
        match self {
            Self::Memory(store) => store.upsert(session, movie).await,
            Self::Rest(store) => store.upsert(session, movie).await,
        }
    }

    async fn delete(&self, session: &UserSession, movie_id: &MovieId) -> FavoritesResult<()> {
        match self {
            Self::Memory(store) => store.delete(session, movie_id).await,
            Self::Rest(store) => store.delete(session, movie_id).await,
        }
    }
}
