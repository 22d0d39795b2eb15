//! Application Layer
//!
//! Favorites synchronizer, per-epoch state, and configuration.

pub mod config;
pub mod state;
pub mod synchronizer;

// Re-exports
pub use config::FavoritesConfig;
pub use synchronizer::FavoritesSynchronizer;
