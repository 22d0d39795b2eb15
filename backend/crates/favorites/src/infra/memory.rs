//! In-Memory Favorites Store
//!
//! Process-local store used when no remote store is configured. Tests use
//! its knobs to slow writes down or make them fail.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use catalog::MovieRecord;
use kernel::id::{MovieId, UserId};
use session::UserSession;

use crate::domain::entity::favorite::MutationKind;
use crate::domain::repository::FavoritesStore;
use crate::error::{FavoritesError, FavoritesResult};

#[derive(Debug, Default)]
struct Data {
    favorites: HashMap<UserId, BTreeMap<MovieId, MovieRecord>>,
    /// Writes that reached the store, in arrival order
    log: Vec<(UserId, MutationKind, MovieId)>,
}

/// In-memory favorites store
#[derive(Debug, Default)]
pub struct InMemoryFavoritesStore {
    data: Mutex<Data>,
    write_latency_ms: AtomicU64,
    failing_writes: AtomicU32,
    rejecting: AtomicBool,
}

impl InMemoryFavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pre-populate a user's favorites
    pub fn seed(&self, user_id: &UserId, movies: impl IntoIterator<Item = MovieRecord>) {
        let mut data = self.data();
        let favorites = data.favorites.entry(user_id.clone()).or_default();
        for movie in movies {
            favorites.insert(movie.id.clone(), movie);
        }
    }

    /// Movie ids stored for a user
    pub fn favorites_of(&self, user_id: &UserId) -> Vec<MovieId> {
        self.data()
            .favorites
            .get(user_id)
            .map(|movies| movies.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Writes applied so far, in order
    pub fn write_log(&self) -> Vec<(UserId, MutationKind, MovieId)> {
        self.data().log.clone()
    }

    /// Delay every write before it is applied
    pub fn set_write_latency(&self, latency: Duration) {
        self.write_latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Fail the next `count` writes with a transient network error
    pub fn fail_next_writes(&self, count: u32) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Reject every write with a permanent error
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    async fn before_write(&self) -> FavoritesResult<()> {
        let latency = self.write_latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.rejecting.load(Ordering::SeqCst) {
            return Err(FavoritesError::Store("write rejected".to_string()));
        }

        let failing = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(FavoritesError::Network("store unreachable".to_string()));
        }
        Ok(())
    }
}

impl FavoritesStore for InMemoryFavoritesStore {
    async fn read_all(&self, session: &UserSession) -> FavoritesResult<Vec<MovieRecord>> {
        Ok(self
            .data()
            .favorites
            .get(&session.user_id)
            .map(|movies| movies.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert(&self, session: &UserSession, movie: &MovieRecord) -> FavoritesResult<()> {
        self.before_write().await?;

        let mut data = self.data();
        data.favorites
            .entry(session.user_id.clone())
            .or_default()
            .insert(movie.id.clone(), movie.clone());
        data.log
            .push((session.user_id.clone(), MutationKind::Add, movie.id.clone()));
        Ok(())
    }

    async fn delete(&self, session: &UserSession, movie_id: &MovieId) -> FavoritesResult<()> {
        self.before_write().await?;

        let mut data = self.data();
        if let Some(movies) = data.favorites.get_mut(&session.user_id) {
            movies.remove(movie_id);
        }
        data.log
            .push((session.user_id.clone(), MutationKind::Remove, movie_id.clone()));
        Ok(())
    }
}
