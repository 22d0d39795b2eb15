//! Domain Layer
//!
//! Contains favorite entries, events, and the store/lookup traits.

pub mod entity;
pub mod repository;

// Re-exports
pub use entity::event::FavoritesEvent;
pub use entity::favorite::{AddOutcome, FavoriteEntry, MutationKind, RemoveOutcome, SyncState};
pub use repository::{FavoritesStore, MovieLookup};
