//! Per-Epoch Favorites State
//!
//! Everything the synchronizer knows about one session epoch: the session,
//! the local entry ledger, the load latch, and the sending half of the
//! epoch's reconciliation queue. A session change replaces the whole value,
//! so late results from a previous epoch can only touch a detached ledger.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use catalog::MovieRecord;
use chrono::{DateTime, Utc};
use kernel::id::MovieId;
use session::{SessionEpoch, UserSession};
use tokio::sync::{OnceCell, broadcast, mpsc, oneshot};

use crate::domain::entity::event::FavoritesEvent;
use crate::domain::entity::favorite::{FavoriteEntry, MutationKind, SyncState};
use crate::error::{FavoritesError, FavoritesResult};

/// One queued remote write
#[derive(Debug)]
pub struct SyncJob {
    pub movie: MovieRecord,
    pub mutation: MutationKind,
    /// Ledger sequence number of the local mutation
    pub seq: u64,
    pub reply: oneshot::Sender<FavoritesResult<()>>,
}

/// Result of submitting a local mutation
#[derive(Debug)]
pub enum Submission {
    /// Already in the requested state; nothing queued
    Unchanged,
    /// Applied locally and queued; resolves when the store answers
    Queued(oneshot::Receiver<FavoritesResult<()>>),
}

#[derive(Debug, Clone)]
struct LocalEntry {
    movie: MovieRecord,
    present: bool,
    /// Membership last confirmed by the store
    committed_present: bool,
    sync: SyncState,
    /// Sequence number of the newest mutation
    seq: u64,
    mutated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Ledger {
    entries: HashMap<MovieId, LocalEntry>,
    next_seq: u64,
}

/// Favorites state for one session epoch
#[derive(Debug)]
pub struct EpochState {
    pub epoch: SessionEpoch,
    /// None for a signed-out epoch
    pub session: Option<UserSession>,
    ledger: Mutex<Ledger>,
    loaded: OnceCell<()>,
    jobs: mpsc::UnboundedSender<SyncJob>,
    events: broadcast::Sender<FavoritesEvent>,
}

impl EpochState {
    pub fn new(
        epoch: SessionEpoch,
        session: Option<UserSession>,
        jobs: mpsc::UnboundedSender<SyncJob>,
        events: broadcast::Sender<FavoritesEvent>,
    ) -> Self {
        Self {
            epoch,
            session,
            ledger: Mutex::new(Ledger::default()),
            loaded: OnceCell::new(),
            jobs,
            events,
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> FavoritesResult<&UserSession> {
        self.session.as_ref().ok_or(FavoritesError::NotAuthenticated)
    }

    /// Load latch, initialized once the remote set has been merged
    pub fn load_latch(&self) -> &OnceCell<()> {
        &self.loaded
    }

    pub fn emit(&self, event: FavoritesEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn is_present(&self, movie_id: &MovieId) -> bool {
        self.ledger()
            .entries
            .get(movie_id)
            .is_some_and(|entry| entry.present)
    }

    /// Record already held for `movie_id`, if any
    pub fn known_record(&self, movie_id: &MovieId) -> Option<MovieRecord> {
        self.ledger()
            .entries
            .get(movie_id)
            .map(|entry| entry.movie.clone())
    }

    /// Merge the remote set as committed entries; returns how many were added
    pub fn merge_loaded(&self, records: Vec<MovieRecord>) -> usize {
        let now = Utc::now();
        let mut ledger = self.ledger();
        let mut added = 0;
        for movie in records {
            ledger.entries.entry(movie.id.clone()).or_insert_with(|| {
                added += 1;
                LocalEntry {
                    movie,
                    present: true,
                    committed_present: true,
                    sync: SyncState::Committed,
                    seq: 0,
                    mutated_at: now,
                }
            });
        }
        added
    }

    /// Apply a mutation locally and queue its remote write.
    ///
    /// The ledger update and the enqueue happen under one lock so queue
    /// order always matches local application order.
    pub fn submit(
        &self,
        movie: MovieRecord,
        mutation: MutationKind,
    ) -> FavoritesResult<Submission> {
        let desired = mutation.desired_presence();
        let movie_id = movie.id.clone();

        let mut ledger = self.ledger();
        let currently = ledger
            .entries
            .get(&movie_id)
            .is_some_and(|entry| entry.present);
        if currently == desired {
            return Ok(Submission::Unchanged);
        }

        ledger.next_seq += 1;
        let seq = ledger.next_seq;
        let now = Utc::now();

        let (reply, outcome) = oneshot::channel();
        let job = SyncJob {
            movie: movie.clone(),
            mutation,
            seq,
            reply,
        };
        if self.jobs.send(job).is_err() {
            // Worker already gone: this epoch is over
            return Err(FavoritesError::Discarded);
        }

        let entry = ledger
            .entries
            .entry(movie_id.clone())
            .or_insert_with(|| LocalEntry {
                movie: movie.clone(),
                present: false,
                committed_present: false,
                sync: SyncState::Committed,
                seq: 0,
                mutated_at: now,
            });
        entry.movie = movie;
        entry.present = desired;
        entry.sync = SyncState::Pending(mutation);
        entry.seq = seq;
        entry.mutated_at = now;

        let event = match mutation {
            MutationKind::Add => FavoritesEvent::Added {
                epoch: self.epoch,
                movie_id,
            },
            MutationKind::Remove => FavoritesEvent::Removed {
                epoch: self.epoch,
                movie_id,
            },
        };
        self.emit(event);

        Ok(Submission::Queued(outcome))
    }

    /// Record a successful remote write. Returns true if it was the newest
    /// mutation for the movie.
    pub fn commit(&self, movie_id: &MovieId, seq: u64, mutation: MutationKind) -> bool {
        let mut ledger = self.ledger();
        let Some(entry) = ledger.entries.get_mut(movie_id) else {
            return false;
        };

        entry.committed_present = mutation.desired_presence();
        if entry.seq != seq {
            return false;
        }

        entry.sync = SyncState::Committed;
        if !entry.present {
            ledger.entries.remove(movie_id);
        }
        true
    }

    /// Undo a failed mutation if nothing newer was applied on top of it.
    /// Returns true if the local state was restored.
    pub fn roll_back(&self, movie_id: &MovieId, seq: u64) -> bool {
        let mut ledger = self.ledger();
        let Some(entry) = ledger.entries.get_mut(movie_id) else {
            return false;
        };
        if entry.seq != seq {
            return false;
        }

        entry.present = entry.committed_present;
        entry.sync = SyncState::RolledBack;
        entry.mutated_at = Utc::now();
        true
    }

    /// Present favorites, sorted by title then id
    pub fn favorites(&self) -> Vec<MovieRecord> {
        let mut movies: Vec<MovieRecord> = self
            .ledger()
            .entries
            .values()
            .filter(|entry| entry.present)
            .map(|entry| entry.movie.clone())
            .collect();
        movies.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        movies
    }

    /// All local entries including pending removals and rollbacks
    pub fn entries(&self) -> FavoritesResult<Vec<FavoriteEntry>> {
        let user_id = self.session()?.user_id.clone();
        let mut entries: Vec<FavoriteEntry> = self
            .ledger()
            .entries
            .values()
            .map(|entry| FavoriteEntry {
                user_id: user_id.clone(),
                movie: entry.movie.clone(),
                present: entry.present,
                sync: entry.sync,
                mutated_at: entry.mutated_at,
            })
            .collect();
        entries.sort_by(|a, b| {
            a.movie
                .title
                .cmp(&b.movie.title)
                .then_with(|| a.movie.id.cmp(&b.movie.id))
        });
        Ok(entries)
    }
}
