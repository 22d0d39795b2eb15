//! REST Favorites Store
//!
//! JSON over HTTP, one document per favorite:
//!
//! - `GET    {base}/users/{user_id}/favorites`            -> `[MovieRecord]`
//! - `PUT    {base}/users/{user_id}/favorites/{movie_id}` <- `MovieRecord`
//! - `DELETE {base}/users/{user_id}/favorites/{movie_id}`
//!
//! Requests carry the session's provider token as a bearer credential.

use catalog::MovieRecord;
use kernel::id::{MovieId, UserId};
use platform::http::{HttpClientConfig, build_client, is_transient_status};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use session::UserSession;

use crate::domain::repository::FavoritesStore;
use crate::error::{FavoritesError, FavoritesResult};

/// REST favorites store
#[derive(Debug, Clone)]
pub struct RestFavoritesStore {
    http: reqwest::Client,
    base_url: Url,
}

impl RestFavoritesStore {
    pub fn new(base_url: &str, config: &HttpClientConfig) -> FavoritesResult<Self> {
        let http = build_client(config).map_err(|e| FavoritesError::Internal(e.to_string()))?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> FavoritesResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FavoritesError::Internal(format!("Invalid store URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FavoritesError::Internal(format!(
                "Store URL cannot be a base: {base_url}"
            )));
        }
        Ok(Self { http, base_url })
    }

    fn url(&self, user_id: &UserId, movie_id: Option<&MovieId>) -> FavoritesResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FavoritesError::Internal("Store URL cannot be a base".to_string()))?;
            segments
                .pop_if_empty()
                .push("users")
                .push(user_id.as_str())
                .push("favorites");
            if let Some(movie_id) = movie_id {
                segments.push(movie_id.as_str());
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        session: &UserSession,
        operation: &str,
    ) -> FavoritesResult<Response> {
        let response = request.bearer_auth(session.token.expose()).send().await?;
        let status = response.status();

        tracing::debug!(
            operation,
            user_id = %session.user_id,
            status = status.as_u16(),
            "Favorites store request completed"
        );
        Ok(response)
    }
}

fn status_error(status: StatusCode, operation: &str) -> FavoritesError {
    let message = format!("{operation}: {status}");
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        FavoritesError::NotAuthenticated
    } else if is_transient_status(status) {
        FavoritesError::Network(message)
    } else {
        FavoritesError::Store(message)
    }
}

impl FavoritesStore for RestFavoritesStore {
    async fn read_all(&self, session: &UserSession) -> FavoritesResult<Vec<MovieRecord>> {
        let url = self.url(&session.user_id, None)?;
        let response = self
            .send(self.http.get(url), session, "favorites.read_all")
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(status_error(status, "favorites.read_all")),
        }
    }

    async fn upsert(&self, session: &UserSession, movie: &MovieRecord) -> FavoritesResult<()> {
        let url = self.url(&session.user_id, Some(&movie.id))?;
        let response = self
            .send(self.http.put(url).json(movie), session, "favorites.upsert")
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(status_error(status, "favorites.upsert")),
        }
    }

    async fn delete(&self, session: &UserSession, movie_id: &MovieId) -> FavoritesResult<()> {
        let url = self.url(&session.user_id, Some(movie_id))?;
        let response = self
            .send(self.http.delete(url), session, "favorites.delete")
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(()),
            status if status.is_success() => Ok(()),
            status => Err(status_error(status, "favorites.delete")),
        }
    }
}
