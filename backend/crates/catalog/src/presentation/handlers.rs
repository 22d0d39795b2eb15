//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use kernel::id::MovieId;

use crate::application::cache::{CacheStats, CatalogCache};
use crate::application::image::ImageResolver;
use crate::domain::entity::{genre::Genre, movie::MovieRecord};
use crate::domain::repository::CatalogSource;
use crate::domain::value_object::discover_query::DiscoverQuery;
use crate::domain::value_object::size_class::SizeClass;
use crate::error::CatalogResult;
use crate::presentation::dto::{
    DiscoverParams, ImageParams, ImageResponse, MovieListResponse, MovieResponse, MovieView,
    SearchParams, TopParams,
};

/// Default size of the home feed
const TOP_MOVIES_LIMIT: usize = 20;

/// Shared state for catalog handlers
pub struct CatalogAppState<S>
where
    S: CatalogSource + Send + Sync + 'static,
{
    pub cache: Arc<CatalogCache<S>>,
    pub images: Arc<ImageResolver>,
}

impl<S> Clone for CatalogAppState<S>
where
    S: CatalogSource + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            images: Arc::clone(&self.images),
        }
    }
}

impl<S> CatalogAppState<S>
where
    S: CatalogSource + Send + Sync + 'static,
{
    fn view(&self, record: MovieRecord) -> MovieView {
        let poster_url = self.images.resolve_record(&record, SizeClass::Medium);
        MovieView { record, poster_url }
    }

    fn views(&self, records: Vec<MovieRecord>) -> Vec<MovieView> {
        records.into_iter().map(|r| self.view(r)).collect()
    }
}

// ============================================================================
// Movies
// ============================================================================

/// GET /api/catalog/movies/{id}
pub async fn get_movie<S>(
    State(state): State<CatalogAppState<S>>,
    Path(id): Path<String>,
) -> CatalogResult<Json<MovieResponse>>
where
    S: CatalogSource + Send + Sync + 'static,
{
    let movie = match MovieId::parse(id) {
        Ok(id) => state.cache.get(&id).await?,
        Err(err) if err.kind().is_benign() => {
            tracing::debug!(error = %err, "Unusable movie id, answering null");
            None
        }
        Err(err) => return Err(err.into()),
    };

    Ok(Json(MovieResponse {
        movie: movie.map(|record| state.view(record)),
    }))
}

/// GET /api/catalog/movies/top?limit=
pub async fn top_movies<S>(
    State(state): State<CatalogAppState<S>>,
    Query(params): Query<TopParams>,
) -> CatalogResult<Json<MovieListResponse>>
where
    S: CatalogSource + Send + Sync + 'static,
{
    let limit = params.limit.unwrap_or(TOP_MOVIES_LIMIT);
    let records = state.cache.top_movies(limit).await?;

    Ok(Json(MovieListResponse {
        results: state.views(records),
    }))
}

/// GET /api/catalog/movies/search?query=
pub async fn search_movies<S>(
    State(state): State<CatalogAppState<S>>,
    Query(params): Query<SearchParams>,
) -> CatalogResult<Json<MovieListResponse>>
where
    S: CatalogSource + Send + Sync + 'static,
{
    let records = state.cache.search(&params.query).await?;

    Ok(Json(MovieListResponse {
        results: state.views(records),
    }))
}

// ============================================================================
// Browse
// ============================================================================

/// GET /api/catalog/genres
pub async fn list_genres<S>(
    State(state): State<CatalogAppState<S>>,
) -> CatalogResult<Json<Vec<Genre>>>
where
    S: CatalogSource + Send + Sync + 'static,
{
    Ok(Json(state.cache.genres().await?))
}

/// GET /api/catalog/discover?genreId=&year=&page=
pub async fn discover<S>(
    State(state): State<CatalogAppState<S>>,
    Query(params): Query<DiscoverParams>,
) -> CatalogResult<Json<MovieListResponse>>
where
    S: CatalogSource + Send + Sync + 'static,
{
    let mut query = DiscoverQuery {
        include_adult: params.include_adult,
        ..DiscoverQuery::default()
    };
    if let Some(genre_id) = params.genre_id {
        query = query.genre(genre_id);
    }
    if let Some(year) = params.year {
        query = query.year(year);
    }
    if let Some(page) = params.page {
        query = query.page(page);
    }

    let records = state.cache.discover(&query).await?;

    Ok(Json(MovieListResponse {
        results: state.views(records),
    }))
}

// ============================================================================
// Images
// ============================================================================

/// GET /api/catalog/images?reference=&size=
pub async fn resolve_image<S>(
    State(state): State<CatalogAppState<S>>,
    Query(params): Query<ImageParams>,
) -> CatalogResult<Json<ImageResponse>>
where
    S: CatalogSource + Send + Sync + 'static,
{
    let url = match state.images.resolve(&params.reference, params.size) {
        Ok(url) => Some(url),
        Err(err) if err.kind().is_benign() => {
            tracing::debug!(error = %err, "Unresolvable image reference, answering null");
            None
        }
        Err(err) => return Err(err),
    };

    Ok(Json(ImageResponse {
        url,
        size: params.size,
    }))
}

// ============================================================================
// Diagnostics
// ============================================================================

/// GET /api/catalog/stats
pub async fn cache_stats<S>(State(state): State<CatalogAppState<S>>) -> Json<CacheStats>
where
    S: CatalogSource + Send + Sync + 'static,
{
    Json(state.cache.stats().await)
}
