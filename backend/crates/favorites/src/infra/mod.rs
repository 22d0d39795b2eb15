//! Infrastructure Layer
//!
//! Favorites store adapters and the catalog-backed movie lookup.

pub mod backend;
pub mod lookup;
pub mod memory;
pub mod rest;

pub use backend::FavoritesBackend;
pub use memory::InMemoryFavoritesStore;
pub use rest::RestFavoritesStore;
