//! Domain Layer
//!
//! Contains entities, value objects, and the catalog source trait.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{genre::Genre, movie::MovieRecord};
pub use repository::CatalogSource;
