//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::entity::movie::MovieRecord;
use crate::domain::value_object::size_class::SizeClass;

// ============================================================================
// Movies
// ============================================================================

/// Movie record plus its resolved poster URL
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieView {
    #[serde(flatten)]
    pub record: MovieRecord,
    pub poster_url: Option<String>,
}

/// Single movie lookup response; `movie` is null when the catalog has no such id
#[derive(Debug, Clone, Serialize)]
pub struct MovieResponse {
    pub movie: Option<MovieView>,
}

/// List response for search and discover
#[derive(Debug, Clone, Serialize)]
pub struct MovieListResponse {
    pub results: Vec<MovieView>,
}

/// Search query string
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

/// Home feed query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopParams {
    pub limit: Option<usize>,
}

/// Discover query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverParams {
    pub genre_id: Option<u32>,
    pub year: Option<i32>,
    pub page: Option<u32>,
    #[serde(default)]
    pub include_adult: bool,
}

// ============================================================================
// Images
// ============================================================================

/// Image resolution query string
#[derive(Debug, Clone, Deserialize)]
pub struct ImageParams {
    pub reference: String,
    #[serde(default)]
    pub size: SizeClass,
}

/// Image resolution response; `url` is null for an unusable reference
#[derive(Debug, Clone, Serialize)]
pub struct ImageResponse {
    pub url: Option<String>,
    pub size: SizeClass,
}
