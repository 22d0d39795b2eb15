//! Catalog Source Trait
//!
//! Interface to the remote movie catalog. Implementation is in the
//! infrastructure layer; the cache only sees this trait.

use kernel::id::MovieId;

use crate::domain::entity::{genre::Genre, movie::MovieRecord};
use crate::domain::value_object::discover_query::DiscoverQuery;
use crate::error::CatalogResult;

/// Remote catalog trait
#[trait_variant::make(CatalogSource: Send)]
pub trait LocalCatalogSource {
    /// Fetch a single movie. A provider "not found" is `Ok(None)`.
    async fn fetch_movie(&self, id: &MovieId) -> CatalogResult<Option<MovieRecord>>;

    /// Free-text search, in provider relevance order
    async fn search_movies(&self, query: &str) -> CatalogResult<Vec<MovieRecord>>;

    /// Genre list used by the discover screen
    async fn genres(&self) -> CatalogResult<Vec<Genre>>;

    /// Browse by genre and release year
    async fn discover(&self, query: &DiscoverQuery) -> CatalogResult<Vec<MovieRecord>>;

    /// Home feed: currently popular movies, in provider order
    async fn top_movies(&self) -> CatalogResult<Vec<MovieRecord>>;
}
