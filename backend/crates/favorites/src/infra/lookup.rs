//! Catalog Movie Lookup
//!
//! Resolves movie ids through the shared catalog cache, so adding a
//! favorite that was just browsed costs no extra upstream call.

use catalog::{CatalogCache, CatalogSource, MovieRecord};
use kernel::id::MovieId;

use crate::domain::repository::MovieLookup;
use crate::error::FavoritesResult;

impl<S> MovieLookup for CatalogCache<S>
where
    S: CatalogSource + Send + Sync + 'static,
{
    async fn lookup(&self, id: &MovieId) -> FavoritesResult<Option<MovieRecord>> {
        Ok(self.get(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use catalog::{CatalogConfig, CatalogError, CatalogResult, DiscoverQuery, Genre};
    use kernel::error::kind::ErrorKind;

    #[derive(Default)]
    struct OneMovie {
        fetches: AtomicUsize,
    }

    impl CatalogSource for OneMovie {
        async fn fetch_movie(&self, id: &MovieId) -> CatalogResult<Option<MovieRecord>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match id.as_str() {
                "27205" => Ok(Some(MovieRecord::new(id.clone(), "Inception"))),
                "garbled" => Err(CatalogError::Decode("unexpected token".into())),
                _ => Ok(None),
            }
        }

        async fn search_movies(&self, _query: &str) -> CatalogResult<Vec<MovieRecord>> {
            Ok(Vec::new())
        }

        async fn genres(&self) -> CatalogResult<Vec<Genre>> {
            Ok(Vec::new())
        }

        async fn discover(&self, _query: &DiscoverQuery) -> CatalogResult<Vec<MovieRecord>> {
            Ok(Vec::new())
        }

        async fn top_movies(&self) -> CatalogResult<Vec<MovieRecord>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_lookup_goes_through_cache() {
        let source = Arc::new(OneMovie::default());
        let cache = CatalogCache::new(Arc::clone(&source), &CatalogConfig::development());
        let id = MovieId::parse("27205").unwrap();

        let first = cache.lookup(&id).await.unwrap().unwrap();
        let second = cache.lookup(&id).await.unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        let missing = MovieId::parse("1").unwrap();
        assert!(cache.lookup(&missing).await.unwrap().is_none());

        let err = cache
            .lookup(&MovieId::parse("garbled").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
