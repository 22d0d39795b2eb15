//! Favorites Router

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::application::synchronizer::FavoritesSynchronizer;
use crate::domain::repository::{FavoritesStore, MovieLookup};
use crate::presentation::handlers::{self, FavoritesAppState};

/// Create the favorites router for any store and lookup
pub fn favorites_router<R, L>(sync: Arc<FavoritesSynchronizer<R, L>>) -> Router
where
    R: FavoritesStore + Send + Sync + 'static,
    L: MovieLookup + Send + Sync + 'static,
{
    let state = FavoritesAppState { sync };

    Router::new()
        .route("/", get(handlers::list_favorites::<R, L>))
        .route("/entries", get(handlers::list_entries::<R, L>))
        .route(
            "/{id}",
            axum::routing::put(handlers::add_favorite::<R, L>)
                .delete(handlers::remove_favorite::<R, L>),
        )
        .route("/events", get(handlers::favorites_events::<R, L>))
        .with_state(state)
}
