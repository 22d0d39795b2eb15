//! Favorites Module
//!
//! Clean Architecture structure:
//! - `domain/` - Favorite entries, sync state, events, store and lookup traits
//! - `application/` - Synchronizer, per-epoch state, configuration
//! - `infra/` - In-memory and REST stores, catalog-backed movie lookup
//! - `presentation/` - HTTP handlers, DTOs, router, SSE stream
//!
//! ## Consistency model
//! - Mutations apply locally at once and are reconciled by one FIFO worker
//!   per session epoch, so same-movie mutations keep submission order
//! - A write that still fails after retries is rolled back locally and
//!   reported as a sync error
//! - A session change detaches the old epoch's state: its queued writes are
//!   discarded and an in-flight write is abandoned, so a slow response for
//!   one user can never land in the next user's list

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::FavoritesConfig;
pub use application::synchronizer::FavoritesSynchronizer;
pub use domain::entity::event::FavoritesEvent;
pub use domain::entity::favorite::{
    AddOutcome, FavoriteEntry, MutationKind, RemoveOutcome, SyncState,
};
pub use domain::repository::{FavoritesStore, MovieLookup};
pub use error::{FavoritesError, FavoritesResult};
pub use infra::backend::FavoritesBackend;
pub use infra::memory::InMemoryFavoritesStore;
pub use infra::rest::RestFavoritesStore;
pub use presentation::router::favorites_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
