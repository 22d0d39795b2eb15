//! Application Layer
//!
//! Catalog cache, image resolution and configuration.

pub mod cache;
pub mod config;
pub mod image;

// Re-exports
pub use cache::{CacheStats, CatalogCache};
pub use config::CatalogConfig;
pub use image::ImageResolver;
