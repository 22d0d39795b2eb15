//! Catalog Module
//!
//! Clean Architecture structure:
//! - `domain/` - Movie records, genres, the `CatalogSource` seam
//! - `application/` - Catalog cache, image resolver, configuration
//! - `infra/` - TMDB HTTP client
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Typed movie fetch, search, genre list, discover queries and the home feed
//! - moka-backed LRU + TTL cache with one upstream fetch per movie id
//! - API key rotation when the provider rate-limits a key
//! - Poster/backdrop reference to URL resolution

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::cache::{CacheStats, CatalogCache};
pub use application::config::CatalogConfig;
pub use application::image::ImageResolver;
pub use domain::entity::{genre::Genre, movie::MovieRecord};
pub use domain::repository::CatalogSource;
pub use domain::value_object::{discover_query::DiscoverQuery, size_class::SizeClass};
pub use error::{CatalogError, CatalogResult};
pub use infra::tmdb::TmdbCatalog;
pub use presentation::router::catalog_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
pub use kernel::id::MovieId;
