//! Infrastructure Layer
//!
//! Catalog provider adapters.

pub mod tmdb;

pub use tmdb::TmdbCatalog;
