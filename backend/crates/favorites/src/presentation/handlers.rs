//! HTTP Handlers

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use kernel::id::MovieId;
use tokio_stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::application::synchronizer::FavoritesSynchronizer;
use crate::domain::entity::favorite::AddOutcome;
use crate::domain::repository::{FavoritesStore, MovieLookup};
use crate::error::FavoritesResult;
use crate::presentation::dto::{AddResponse, EntriesResponse, FavoritesResponse, RemoveResponse};

/// Shared state for favorites handlers
pub struct FavoritesAppState<R, L>
where
    R: FavoritesStore + Send + Sync + 'static,
    L: MovieLookup + Send + Sync + 'static,
{
    pub sync: Arc<FavoritesSynchronizer<R, L>>,
}

impl<R, L> Clone for FavoritesAppState<R, L>
where
    R: FavoritesStore + Send + Sync + 'static,
    L: MovieLookup + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            sync: Arc::clone(&self.sync),
        }
    }
}

// ============================================================================
// Listing
// ============================================================================

/// GET /api/favorites
pub async fn list_favorites<R, L>(
    State(state): State<FavoritesAppState<R, L>>,
) -> FavoritesResult<Json<FavoritesResponse>>
where
    R: FavoritesStore + Send + Sync + 'static,
    L: MovieLookup + Send + Sync + 'static,
{
    let epoch = state.sync.epoch();
    let favorites = state.sync.list_favorites().await?;

    Ok(Json(FavoritesResponse { epoch, favorites }))
}

/// GET /api/favorites/entries
pub async fn list_entries<R, L>(
    State(state): State<FavoritesAppState<R, L>>,
) -> FavoritesResult<Json<EntriesResponse>>
where
    R: FavoritesStore + Send + Sync + 'static,
    L: MovieLookup + Send + Sync + 'static,
{
    let epoch = state.sync.epoch();
    let entries = state.sync.entries().await?;

    Ok(Json(EntriesResponse { epoch, entries }))
}

// ============================================================================
// Mutations
// ============================================================================

/// PUT /api/favorites/{id}
///
/// 201 when the movie was added, 200 when it was already a favorite.
pub async fn add_favorite<R, L>(
    State(state): State<FavoritesAppState<R, L>>,
    Path(id): Path<String>,
) -> FavoritesResult<(StatusCode, Json<AddResponse>)>
where
    R: FavoritesStore + Send + Sync + 'static,
    L: MovieLookup + Send + Sync + 'static,
{
    let movie_id = MovieId::parse(id)?;
    let outcome = state.sync.add_favorite(&movie_id).await?;

    let status = match outcome {
        AddOutcome::Added => StatusCode::CREATED,
        AddOutcome::AlreadyPresent => StatusCode::OK,
    };
    Ok((status, Json(AddResponse { movie_id, outcome })))
}

/// DELETE /api/favorites/{id}
pub async fn remove_favorite<R, L>(
    State(state): State<FavoritesAppState<R, L>>,
    Path(id): Path<String>,
) -> FavoritesResult<Json<RemoveResponse>>
where
    R: FavoritesStore + Send + Sync + 'static,
    L: MovieLookup + Send + Sync + 'static,
{
    let movie_id = MovieId::parse(id)?;
    let outcome = state.sync.remove_favorite(&movie_id).await?;

    Ok(Json(RemoveResponse { movie_id, outcome }))
}

// ============================================================================
// Events
// ============================================================================

/// GET /api/favorites/events (SSE)
pub async fn favorites_events<R, L>(
    State(state): State<FavoritesAppState<R, L>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    R: FavoritesStore + Send + Sync + 'static,
    L: MovieLookup + Send + Sync + 'static,
{
    let stream = BroadcastStream::new(state.sync.events()).filter_map(|event| match event {
        Ok(event) => match Event::default().event(event.name()).json_data(&event) {
            Ok(sse) => Some(Ok(sse)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode favorites event");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "Favorites event subscriber lagged");
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
