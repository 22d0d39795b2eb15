//! Catalog Cache
//!
//! LRU + TTL cache in front of a [`CatalogSource`], backed by
//! [`moka::future::Cache`].
//!
//! Concurrent `get`s for the same uncached id share one upstream fetch
//! through `try_get_with`. A "not found" answer or a failed fetch is
//! handed to every waiter but never stored.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use kernel::id::MovieId;
use moka::future::Cache;
use moka::notification::RemovalCause;
use moka::policy::EvictionPolicy;
use platform::retry::{RetryPolicy, retry};
use serde::Serialize;

use crate::application::config::CatalogConfig;
use crate::domain::entity::{genre::Genre, movie::MovieRecord};
use crate::domain::repository::CatalogSource;
use crate::domain::value_object::discover_query::DiscoverQuery;
use crate::error::{CatalogError, CatalogResult};

/// Point-in-time cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Calls made to the catalog source, retries included
    pub upstream_calls: u64,
    pub evictions: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    upstream_calls: AtomicU64,
    evictions: Arc<AtomicU64>,
}

/// Why a shared fetch produced no record to store
enum Miss {
    NotFound,
    Failed(CatalogError),
}

/// Catalog cache
pub struct CatalogCache<S>
where
    S: CatalogSource,
{
    source: Arc<S>,
    retry: RetryPolicy,
    records: Cache<MovieId, MovieRecord>,
    counters: Counters,
}

impl<S> CatalogCache<S>
where
    S: CatalogSource,
{
    pub fn new(source: Arc<S>, config: &CatalogConfig) -> Self {
        let counters = Counters::default();
        let evictions = Arc::clone(&counters.evictions);

        let records = Cache::builder()
            .eviction_policy(EvictionPolicy::lru())
            .max_capacity(config.max_entries as u64)
            .time_to_live(config.ttl)
            .eviction_listener(move |id: Arc<MovieId>, _, cause| {
                if cause == RemovalCause::Size {
                    evictions.fetch_add(1, Ordering::Relaxed);
                    tracing::trace!(movie_id = %id, "Catalog cache evicted entry");
                }
            })
            .build();

        Self {
            source,
            retry: config.retry.clone(),
            records,
            counters,
        }
    }

    /// Underlying catalog source
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Get a movie, fetching it on a miss. `Ok(None)` when the catalog has no such movie.
    pub async fn get(&self, id: &MovieId) -> CatalogResult<Option<MovieRecord>> {
        if let Some(record) = self.records.get(id).await {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(movie_id = %id, "Catalog cache hit");
            return Ok(Some(record));
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        let fetched = self
            .records
            .try_get_with(id.clone(), self.fetch_upstream(id))
            .await;
        // Apply recency and capacity eviction before the next lookup
        self.records.run_pending_tasks().await;

        match fetched {
            Ok(record) => Ok(Some(record)),
            Err(miss) => match miss.as_ref() {
                Miss::NotFound => Ok(None),
                Miss::Failed(err) => Err(err.clone()),
            },
        }
    }

    /// [`get`](Self::get) bounded by a caller-supplied timeout
    pub async fn get_with_timeout(
        &self,
        id: &MovieId,
        timeout: Duration,
    ) -> CatalogResult<Option<MovieRecord>> {
        tokio::time::timeout(timeout, self.get(id))
            .await
            .map_err(|_| CatalogError::Timeout(timeout))?
    }

    /// Search the catalog; results also refresh the cache
    pub async fn search(&self, query: &str) -> CatalogResult<Vec<MovieRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let records = retry(&self.retry, "catalog.search_movies", || {
            self.count_upstream_call();
            self.source.search_movies(query)
        })
        .await?;

        self.seed(&records).await;
        tracing::debug!(query, results = records.len(), "Catalog search completed");
        Ok(records)
    }

    /// [`search`](Self::search) bounded by a caller-supplied timeout
    pub async fn search_with_timeout(
        &self,
        query: &str,
        timeout: Duration,
    ) -> CatalogResult<Vec<MovieRecord>> {
        tokio::time::timeout(timeout, self.search(query))
            .await
            .map_err(|_| CatalogError::Timeout(timeout))?
    }

    pub async fn genres(&self) -> CatalogResult<Vec<Genre>> {
        retry(&self.retry, "catalog.genres", || {
            self.count_upstream_call();
            self.source.genres()
        })
        .await
    }

    /// Browse by genre/year; results also refresh the cache
    pub async fn discover(&self, query: &DiscoverQuery) -> CatalogResult<Vec<MovieRecord>> {
        let records = retry(&self.retry, "catalog.discover", || {
            self.count_upstream_call();
            self.source.discover(query)
        })
        .await?;

        self.seed(&records).await;
        Ok(records)
    }

    /// Home feed, at most `limit` movies; results also refresh the cache
    pub async fn top_movies(&self, limit: usize) -> CatalogResult<Vec<MovieRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut records = retry(&self.retry, "catalog.top_movies", || {
            self.count_upstream_call();
            self.source.top_movies()
        })
        .await?;
        records.truncate(limit);

        self.seed(&records).await;
        tracing::debug!(results = records.len(), "Catalog top movies loaded");
        Ok(records)
    }

    /// Drop one cached record
    pub async fn invalidate(&self, id: &MovieId) -> bool {
        self.records.remove(id).await.is_some()
    }

    pub async fn clear(&self) {
        self.records.invalidate_all();
        self.records.run_pending_tasks().await;
        tracing::debug!("Catalog cache cleared");
    }

    pub async fn len(&self) -> usize {
        self.records.run_pending_tasks().await;
        usize::try_from(self.records.entry_count()).unwrap_or(usize::MAX)
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len().await,
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            upstream_calls: self.counters.upstream_calls.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }

    async fn fetch_upstream(&self, id: &MovieId) -> Result<MovieRecord, Miss> {
        tracing::debug!(movie_id = %id, "Catalog cache miss, fetching upstream");
        let fetched = retry(&self.retry, "catalog.fetch_movie", || {
            self.count_upstream_call();
            self.source.fetch_movie(id)
        })
        .await;

        match fetched {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(Miss::NotFound),
            Err(err) => Err(Miss::Failed(err)),
        }
    }

    async fn seed(&self, records: &[MovieRecord]) {
        for record in records {
            self.records.insert(record.id.clone(), record.clone()).await;
        }
        self.records.run_pending_tasks().await;
    }

    fn count_upstream_call(&self) {
        self.counters.upstream_calls.fetch_add(1, Ordering::Relaxed);
    }
}

impl<S> fmt::Debug for CatalogCache<S>
where
    S: CatalogSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogCache")
            .field("entries", &self.records.entry_count())
            .field("hits", &self.counters.hits.load(Ordering::Relaxed))
            .field("misses", &self.counters.misses.load(Ordering::Relaxed))
            .field("retry", &self.retry)
            .finish()
    }
}
