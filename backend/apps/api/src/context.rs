//! Application Context
//!
//! Owns every long-lived component and wires them together. Nothing is a
//! global: `main` builds one context, starts it, serves its router, and
//! stops it on shutdown.

use std::sync::Arc;

use axum::Router;
use catalog::{CatalogCache, CatalogConfig, ImageResolver, TmdbCatalog, catalog_router};
use favorites::{FavoritesBackend, FavoritesConfig, FavoritesSynchronizer, favorites_router};
use session::{InMemoryIdentityProvider, SessionConfig, SessionManager, session_router};
use tokio::task::JoinHandle;

use crate::config::DevIdentity;

pub type Catalog = CatalogCache<TmdbCatalog>;
pub type Favorites = FavoritesSynchronizer<FavoritesBackend, Catalog>;

/// Configuration for every component
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub catalog: CatalogConfig,
    pub session: SessionConfig,
    pub favorites: FavoritesConfig,
    pub dev_identities: Vec<DevIdentity>,
}

pub struct AppContext {
    pub catalog: Arc<Catalog>,
    pub images: ImageResolver,
    pub sessions: Arc<SessionManager<InMemoryIdentityProvider>>,
    pub favorites: Arc<Favorites>,
    listener: Option<JoinHandle<()>>,
}

impl AppContext {
    pub fn new(config: ContextConfig) -> anyhow::Result<Self> {
        let source = TmdbCatalog::new(&config.catalog)?;
        let catalog = Arc::new(CatalogCache::new(Arc::new(source), &config.catalog));
        let images = ImageResolver::new(config.catalog.image_base_url.clone());

        let provider = InMemoryIdentityProvider::new();
        for identity in &config.dev_identities {
            provider.add_identity(
                &identity.provider,
                &identity.token,
                identity.user_id.clone(),
                &identity.display_name,
                identity.email.as_deref(),
            );
        }
        if config.dev_identities.is_empty() {
            tracing::warn!("DEV_IDENTITIES is empty; nobody can sign in");
        }
        let sessions = Arc::new(SessionManager::new(Arc::new(provider), config.session));

        let store = FavoritesBackend::from_config(&config.favorites)?;
        let favorites = Arc::new(FavoritesSynchronizer::new(
            Arc::new(store),
            Arc::clone(&catalog),
            sessions.subscribe(),
            config.favorites,
        ));

        Ok(Self {
            catalog,
            images,
            sessions,
            favorites,
            listener: None,
        })
    }

    /// Start background work (the favorites session listener)
    pub fn start(&mut self) {
        if self.listener.is_none() {
            self.listener = Some(self.favorites.spawn_session_listener());
            tracing::info!("Application context started");
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .nest(
                "/api/catalog",
                catalog_router(Arc::clone(&self.catalog), self.images.clone()),
            )
            .nest("/api/session", session_router(Arc::clone(&self.sessions)))
            .nest("/api/favorites", favorites_router(Arc::clone(&self.favorites)))
    }

    /// Sign out locally and stop background work
    pub async fn stop(mut self) {
        let epoch = self.sessions.sign_out().await;
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }

        let stats = self.catalog.stats().await;
        tracing::info!(
            epoch = %epoch,
            cache_entries = stats.entries,
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            "Application context stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn config() -> ContextConfig {
        ContextConfig {
            catalog: CatalogConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                api_keys: vec!["test-key".to_string()],
                ..CatalogConfig::development()
            },
            session: SessionConfig::development(),
            favorites: FavoritesConfig::development(),
            dev_identities: vec![DevIdentity::parse("google:alice-token:alice:Alice").unwrap()],
        }
    }

    #[test]
    fn test_requires_an_api_key() {
        let mut config = config();
        config.catalog.api_keys.clear();
        assert!(AppContext::new(config).is_err());
    }

    #[tokio::test]
    async fn test_routes_are_mounted() {
        let mut ctx = AppContext::new(config()).unwrap();
        ctx.start();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = ctx.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let base = format!("http://{addr}/api");
        let client = reqwest::Client::new();

        let stats: Value = client
            .get(format!("{base}/catalog/stats"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stats["entries"], 0);

        let response = client.get(format!("{base}/favorites")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 401);

        let response = client
            .post(format!("{base}/session/sign-in"))
            .json(&json!({"provider": "google", "token": "alice-token"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let favorites: Value = client
            .get(format!("{base}/favorites"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(favorites["favorites"], json!([]));

        ctx.stop().await;
    }
}
