//! TMDB Catalog Client
//!
//! `CatalogSource` implementation over The Movie Database v3 REST API.
//!
//! Status handling:
//! - 404 is a miss (`Ok(None)` for single lookups)
//! - 401 means the key was rejected
//! - 429 rotates to the next API key once, then gives up as `RateLimited`
//! - 408 / 5xx are transient `Network` errors and are retried by the cache

use kernel::id::MovieId;
use platform::http::{ApiKeyRing, build_client, is_transient_status};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::application::config::CatalogConfig;
use crate::domain::entity::genre::Genre;
use crate::domain::entity::movie::{MovieRecord, release_year_from_date};
use crate::domain::repository::CatalogSource;
use crate::domain::value_object::discover_query::DiscoverQuery;
use crate::error::{CatalogError, CatalogResult};

/// TMDB movie payload (subset)
#[derive(Debug, Deserialize)]
struct TmdbMovie {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    vote_average: Option<f64>,
}

impl From<TmdbMovie> for MovieRecord {
    fn from(movie: TmdbMovie) -> Self {
        let mut record = MovieRecord::new(
            MovieId::from_trusted(movie.id.to_string()),
            movie.title.unwrap_or_default(),
        )
        .with_rating(movie.vote_average.unwrap_or_default())
        .with_synopsis(movie.overview.unwrap_or_default());

        if let Some(year) = movie.release_date.as_deref().and_then(release_year_from_date) {
            record = record.with_release_year(year);
        }
        if let Some(poster) = movie.poster_path.filter(|p| !p.trim().is_empty()) {
            record = record.with_poster_ref(poster);
        }
        record
    }
}

#[derive(Debug, Deserialize)]
struct TmdbPage {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

/// Error body returned alongside non-success statuses
#[derive(Debug, Default, Deserialize)]
struct TmdbStatus {
    #[serde(default)]
    status_message: Option<String>,
}

/// TMDB client
#[derive(Debug)]
pub struct TmdbCatalog {
    http: reqwest::Client,
    base_url: String,
    keys: ApiKeyRing,
    language: Option<String>,
}

impl TmdbCatalog {
    /// Build a client from configuration. Fails without at least one API key.
    pub fn new(config: &CatalogConfig) -> CatalogResult<Self> {
        let http = build_client(&config.http).map_err(|e| CatalogError::Internal(e.to_string()))?;
        Self::with_client(http, config)
    }

    /// Build with a caller-supplied `reqwest::Client`
    pub fn with_client(http: reqwest::Client, config: &CatalogConfig) -> CatalogResult<Self> {
        let keys = ApiKeyRing::new(config.api_keys.clone())
            .map_err(|e| CatalogError::Internal(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            keys,
            language: config.language.clone(),
        })
    }

    /// GET `path` and decode the body. `Ok(None)` on 404.
    async fn get_json<T>(&self, path: &str, params: &[(&str, String)]) -> CatalogResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let mut query: Vec<(&str, String)> = params.to_vec();
        if let Some(language) = &self.language {
            query.push(("language", language.clone()));
        }

        let mut key = self.keys.current();
        let mut rotated = false;

        loop {
            let started = std::time::Instant::now();
            let response = self
                .http
                .get(&url)
                .bearer_auth(key.value)
                .query(&query)
                .send()
                .await?;
            let status = response.status();

            tracing::debug!(
                path,
                status = status.as_u16(),
                key_index = key.index,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "TMDB request completed"
            );

            if status == StatusCode::TOO_MANY_REQUESTS {
                if !rotated && self.keys.len() > 1 {
                    rotated = true;
                    key = self.keys.rotate_after(key.index);
                    continue;
                }
                return Err(CatalogError::RateLimited);
            }

            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }

            if status == StatusCode::UNAUTHORIZED {
                return Err(CatalogError::InvalidApiKey);
            }

            let body = response.text().await?;

            if !status.is_success() {
                let detail = serde_json::from_str::<TmdbStatus>(&body)
                    .ok()
                    .and_then(|s| s.status_message)
                    .unwrap_or_else(|| status.to_string());
                let message = format!("{path}: {} {detail}", status.as_u16());
                return Err(if is_transient_status(status) {
                    CatalogError::Network(message)
                } else {
                    CatalogError::Internal(message)
                });
            }

            return serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| CatalogError::Decode(format!("{path}: {e}")));
        }
    }
}

/// TMDB ids are numeric; anything path-unsafe cannot exist upstream
fn is_lookup_safe(id: &MovieId) -> bool {
    id.as_str()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl CatalogSource for TmdbCatalog {
    async fn fetch_movie(&self, id: &MovieId) -> CatalogResult<Option<MovieRecord>> {
        if !is_lookup_safe(id) {
            return Ok(None);
        }

        let movie: Option<TmdbMovie> = self.get_json(&format!("movie/{id}"), &[]).await?;
        Ok(movie.map(MovieRecord::from))
    }

    async fn search_movies(&self, query: &str) -> CatalogResult<Vec<MovieRecord>> {
        let page: Option<TmdbPage> = self
            .get_json(
                "search/movie",
                &[("query", query.to_string()), ("include_adult", "false".to_string())],
            )
            .await?;

        Ok(page
            .map(|p| p.results.into_iter().map(MovieRecord::from).collect())
            .unwrap_or_default())
    }

    async fn genres(&self) -> CatalogResult<Vec<Genre>> {
        let list: Option<TmdbGenreList> = self.get_json("genre/movie/list", &[]).await?;
        Ok(list.map(|l| l.genres).unwrap_or_default())
    }

    async fn discover(&self, query: &DiscoverQuery) -> CatalogResult<Vec<MovieRecord>> {
        let mut params = vec![
            ("sort_by", "popularity.desc".to_string()),
            ("page", query.page.max(1).to_string()),
            ("include_adult", query.include_adult.to_string()),
        ];
        if let Some(genre_id) = query.genre_id {
            params.push(("with_genres", genre_id.to_string()));
        }
        if let Some(year) = query.year {
            params.push(("primary_release_year", year.to_string()));
        }

        let page: Option<TmdbPage> = self.get_json("discover/movie", &params).await?;
        Ok(page
            .map(|p| p.results.into_iter().map(MovieRecord::from).collect())
            .unwrap_or_default())
    }

    async fn top_movies(&self) -> CatalogResult<Vec<MovieRecord>> {
        let page: Option<TmdbPage> = self
            .get_json("movie/popular", &[("page", "1".to_string())])
            .await?;
        Ok(page
            .map(|p| p.results.into_iter().map(MovieRecord::from).collect())
            .unwrap_or_default())
    }
}
