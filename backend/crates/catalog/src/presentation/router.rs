//! Catalog Router

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::application::cache::CatalogCache;
use crate::application::image::ImageResolver;
use crate::domain::repository::CatalogSource;
use crate::presentation::handlers::{self, CatalogAppState};

/// Create the catalog router for any catalog source
pub fn catalog_router<S>(cache: Arc<CatalogCache<S>>, images: ImageResolver) -> Router
where
    S: CatalogSource + Send + Sync + 'static,
{
    let state = CatalogAppState {
        cache,
        images: Arc::new(images),
    };

    Router::new()
        .route("/movies/search", get(handlers::search_movies::<S>))
        .route("/movies/top", get(handlers::top_movies::<S>))
        .route("/movies/{id}", get(handlers::get_movie::<S>))
        .route("/genres", get(handlers::list_genres::<S>))
        .route("/discover", get(handlers::discover::<S>))
        .route("/images", get(handlers::resolve_image::<S>))
        .route("/stats", get(handlers::cache_stats::<S>))
        .with_state(state)
}
