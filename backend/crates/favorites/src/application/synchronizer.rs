//! Favorites Synchronizer
//!
//! Session-scoped favorites with optimistic local mutation and ordered
//! remote reconciliation.
//!
//! Each session epoch gets a fresh [`EpochState`] and one worker task that
//! drains its FIFO queue. The worker races every remote write against the
//! session watch: once the epoch moves on, the in-flight write is dropped,
//! queued jobs are answered with `Discarded`, and the worker exits.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use catalog::MovieRecord;
use kernel::id::MovieId;
use platform::retry::{RetryPolicy, retry};
use session::{SessionEpoch, SessionSnapshot, UserSession};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::application::config::FavoritesConfig;
use crate::application::state::{EpochState, Submission, SyncJob};
use crate::domain::entity::event::FavoritesEvent;
use crate::domain::entity::favorite::{AddOutcome, FavoriteEntry, MutationKind, RemoveOutcome};
use crate::domain::repository::{FavoritesStore, MovieLookup};
use crate::error::{FavoritesError, FavoritesResult};

/// Favorites synchronizer
pub struct FavoritesSynchronizer<R, L>
where
    R: FavoritesStore + Send + Sync + 'static,
    L: MovieLookup + Send + Sync + 'static,
{
    store: Arc<R>,
    lookup: Arc<L>,
    config: FavoritesConfig,
    session: watch::Receiver<SessionSnapshot>,
    current: Mutex<Option<Arc<EpochState>>>,
    events: broadcast::Sender<FavoritesEvent>,
}

impl<R, L> FavoritesSynchronizer<R, L>
where
    R: FavoritesStore + Send + Sync + 'static,
    L: MovieLookup + Send + Sync + 'static,
{
    pub fn new(
        store: Arc<R>,
        lookup: Arc<L>,
        session: watch::Receiver<SessionSnapshot>,
        config: FavoritesConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            store,
            lookup,
            config,
            session,
            current: Mutex::new(None),
            events,
        }
    }

    pub fn store(&self) -> &Arc<R> {
        &self.store
    }

    /// Favorites event stream
    pub fn events(&self) -> broadcast::Receiver<FavoritesEvent> {
        self.events.subscribe()
    }

    /// Epoch the synchronizer is currently serving
    pub fn epoch(&self) -> SessionEpoch {
        self.session.borrow().epoch
    }

    /// Add a movie to the current user's favorites and wait for the store.
    ///
    /// Fails with `NotAuthenticated` without touching anything when signed
    /// out, `MovieNotFound` for ids the catalog does not know, `Sync` when
    /// the write failed after retries (the local add is rolled back), and
    /// `Discarded` when the session changed first.
    pub async fn add_favorite(&self, movie_id: &MovieId) -> FavoritesResult<AddOutcome> {
        let state = self.signed_in_state()?;
        self.ensure_loaded(&state).await?;

        if state.is_present(movie_id) {
            return Ok(AddOutcome::AlreadyPresent);
        }

        let movie = match state.known_record(movie_id) {
            Some(movie) => movie,
            None => self
                .lookup
                .lookup(movie_id)
                .await?
                .ok_or_else(|| FavoritesError::MovieNotFound(movie_id.clone()))?,
        };

        match state.submit(movie, MutationKind::Add)? {
            Submission::Unchanged => Ok(AddOutcome::AlreadyPresent),
            Submission::Queued(outcome) => {
                await_outcome(outcome).await?;
                Ok(AddOutcome::Added)
            }
        }
    }

    /// Remove a movie from the current user's favorites and wait for the store
    pub async fn remove_favorite(&self, movie_id: &MovieId) -> FavoritesResult<RemoveOutcome> {
        let state = self.signed_in_state()?;
        self.ensure_loaded(&state).await?;

        let Some(movie) = state
            .known_record(movie_id)
            .filter(|_| state.is_present(movie_id))
        else {
            return Ok(RemoveOutcome::NotPresent);
        };

        match state.submit(movie, MutationKind::Remove)? {
            Submission::Unchanged => Ok(RemoveOutcome::NotPresent),
            Submission::Queued(outcome) => {
                await_outcome(outcome).await?;
                Ok(RemoveOutcome::Removed)
            }
        }
    }

    /// Current user's favorites, sorted by title then id
    pub async fn list_favorites(&self) -> FavoritesResult<Vec<MovieRecord>> {
        let state = self.signed_in_state()?;
        self.ensure_loaded(&state).await?;
        Ok(state.favorites())
    }

    /// Local entries with their sync state
    pub async fn entries(&self) -> FavoritesResult<Vec<FavoriteEntry>> {
        let state = self.signed_in_state()?;
        self.ensure_loaded(&state).await?;
        state.entries()
    }

    /// Follow the session: reset and eagerly reload on every change.
    ///
    /// Operations also switch epochs lazily, so this only moves the remote
    /// load off the first caller's path. Stops when the session manager
    /// is dropped.
    pub fn spawn_session_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        let mut session = self.session.clone();

        tokio::spawn(async move {
            loop {
                let state = this.current_state();
                if state.is_signed_in() {
                    tokio::select! {
                        biased;
                        changed = session.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            continue;
                        }
                        loaded = this.ensure_loaded(&state) => {
                            if let Err(e) = loaded {
                                tracing::warn!(
                                    epoch = %state.epoch,
                                    error = %e,
                                    "Eager favorites load failed; will retry on next access"
                                );
                            }
                        }
                    }
                }

                if session.changed().await.is_err() {
                    break;
                }
            }
            tracing::debug!("Favorites session listener stopped");
        })
    }

    fn signed_in_state(&self) -> FavoritesResult<Arc<EpochState>> {
        let state = self.current_state();
        if !state.is_signed_in() {
            return Err(FavoritesError::NotAuthenticated);
        }
        Ok(state)
    }

    /// State for the session's current epoch, swapping one in if the epoch moved
    fn current_state(&self) -> Arc<EpochState> {
        let snapshot = self.session.borrow().clone();

        let mut current = lock(&self.current);
        if let Some(state) = current.as_ref().filter(|s| s.epoch == snapshot.epoch) {
            return Arc::clone(state);
        }

        let state = self.start_epoch(snapshot);
        *current = Some(Arc::clone(&state));
        state
    }

    fn start_epoch(&self, snapshot: SessionSnapshot) -> Arc<EpochState> {
        let (jobs, queue) = mpsc::unbounded_channel();
        let user_id = snapshot.session.as_ref().map(|s| s.user_id.clone());
        let state = Arc::new(EpochState::new(
            snapshot.epoch,
            snapshot.session,
            jobs,
            self.events.clone(),
        ));

        if let Some(session) = state.session.clone() {
            tokio::spawn(run_worker(
                Arc::clone(&state),
                session,
                queue,
                Arc::clone(&self.store),
                self.session.clone(),
                self.config.retry.clone(),
            ));
        }

        tracing::info!(
            epoch = %state.epoch,
            user_id = ?user_id.as_ref().map(|id| id.as_str()),
            "Favorites reset for new session epoch"
        );
        state.emit(FavoritesEvent::Reset {
            epoch: state.epoch,
            user_id,
        });
        state
    }

    /// Load the remote set into `state` once; concurrent callers share the load
    async fn ensure_loaded(&self, state: &EpochState) -> FavoritesResult<()> {
        let session = state.session()?;
        state
            .load_latch()
            .get_or_try_init(|| async move {
                let records = retry(&self.config.retry, "favorites.read_all", || {
                    self.store.read_all(session)
                })
                .await?;

                let count = state.merge_loaded(records);
                tracing::info!(
                    user_id = %session.user_id,
                    epoch = %state.epoch,
                    count,
                    "Favorites loaded"
                );
                state.emit(FavoritesEvent::Loaded {
                    epoch: state.epoch,
                    count,
                });
                Ok::<(), FavoritesError>(())
            })
            .await?;
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn await_outcome(
    outcome: tokio::sync::oneshot::Receiver<FavoritesResult<()>>,
) -> FavoritesResult<()> {
    outcome.await.unwrap_or(Err(FavoritesError::Discarded))
}

/// Resolves once the session has left `epoch` (or the session manager is gone)
async fn epoch_ended(session: &mut watch::Receiver<SessionSnapshot>, epoch: SessionEpoch) {
    let _ = session.wait_for(|snapshot| snapshot.epoch != epoch).await;
}

/// FIFO reconciliation worker for one epoch
async fn run_worker<R>(
    state: Arc<EpochState>,
    user: UserSession,
    mut queue: mpsc::UnboundedReceiver<SyncJob>,
    store: Arc<R>,
    mut session: watch::Receiver<SessionSnapshot>,
    policy: RetryPolicy,
) where
    R: FavoritesStore + Send + Sync + 'static,
{
    let epoch = state.epoch;
    tracing::debug!(epoch = %epoch, user_id = %user.user_id, "Favorites worker started");

    loop {
        let job = tokio::select! {
            biased;
            _ = epoch_ended(&mut session, epoch) => break,
            job = queue.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };
        let SyncJob {
            movie,
            mutation,
            seq,
            reply,
        } = job;

        let write = async {
            match mutation {
                MutationKind::Add => {
                    retry(&policy, "favorites.upsert", || store.upsert(&user, &movie)).await
                }
                MutationKind::Remove => {
                    retry(&policy, "favorites.delete", || store.delete(&user, &movie.id)).await
                }
            }
        };

        let result = tokio::select! {
            biased;
            _ = epoch_ended(&mut session, epoch) => {
                tracing::info!(
                    epoch = %epoch,
                    movie_id = %movie.id,
                    "Abandoning in-flight favorites write for ended session"
                );
                let _ = reply.send(Err(FavoritesError::Discarded));
                break;
            }
            result = write => result,
        };

        let answer = match result {
            Ok(()) => {
                let latest = state.commit(&movie.id, seq, mutation);
                tracing::debug!(movie_id = %movie.id, ?mutation, latest, "Favorite committed");
                state.emit(FavoritesEvent::Committed {
                    epoch,
                    movie_id: movie.id.clone(),
                    mutation,
                });
                Ok(())
            }
            Err(e) => {
                let rolled_back = state.roll_back(&movie.id, seq);
                tracing::warn!(
                    movie_id = %movie.id,
                    ?mutation,
                    rolled_back,
                    error = %e,
                    "Favorite write failed after retries"
                );
                if rolled_back {
                    state.emit(FavoritesEvent::RolledBack {
                        epoch,
                        movie_id: movie.id.clone(),
                        mutation,
                    });
                }
                Err(FavoritesError::Sync {
                    movie_id: movie.id.clone(),
                    reason: e.to_string(),
                })
            }
        };

        // The caller may have given up waiting
        let _ = reply.send(answer);
    }

    queue.close();
    let mut discarded = 0usize;
    while let Some(job) = queue.recv().await {
        let _ = job.reply.send(Err(FavoritesError::Discarded));
        discarded += 1;
    }
    tracing::debug!(epoch = %epoch, discarded, "Favorites worker stopped");
}
