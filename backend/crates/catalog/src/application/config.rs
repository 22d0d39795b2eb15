//! Application Configuration
//!
//! Configuration for the catalog client and cache.

use std::time::Duration;

use platform::config::{ConfigError, env_duration_secs, env_list, env_or, env_string};
use platform::http::HttpClientConfig;
use platform::retry::RetryPolicy;

/// Catalog configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Catalog API base URL (no trailing slash)
    pub base_url: String,
    /// Image CDN base URL (no trailing slash)
    pub image_base_url: String,
    /// Provider API keys, rotated on rate limiting
    pub api_keys: Vec<String>,
    /// Response language (e.g. `es-ES`)
    pub language: Option<String>,
    /// HTTP client settings
    pub http: HttpClientConfig,
    /// Cache capacity (`maxEntries`)
    pub max_entries: usize,
    /// Cache entry lifetime (`ttlSeconds`)
    pub ttl: Duration,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            api_keys: Vec::new(),
            language: None,
            http: HttpClientConfig::default(),
            max_entries: 256,
            ttl: Duration::from_secs(600),
            retry: RetryPolicy::default(),
        }
    }
}

impl CatalogConfig {
    /// Load from `TMDB_*` and `CATALOG_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let http = HttpClientConfig {
            timeout: env_duration_secs("CATALOG_REQUEST_TIMEOUT_SECS", defaults.http.timeout)?,
            ..defaults.http.clone()
        };

        let retry = RetryPolicy {
            max_attempts: env_or("CATALOG_RETRY_ATTEMPTS", defaults.retry.max_attempts)?,
            ..defaults.retry.clone()
        };

        Ok(Self {
            base_url: trim_base(env_string("TMDB_BASE_URL").unwrap_or(defaults.base_url)),
            image_base_url: trim_base(
                env_string("TMDB_IMAGE_BASE_URL").unwrap_or(defaults.image_base_url),
            ),
            api_keys: env_list("TMDB_API_KEYS"),
            language: env_string("TMDB_LANGUAGE"),
            http,
            max_entries: env_or("CATALOG_MAX_ENTRIES", defaults.max_entries)?,
            ttl: env_duration_secs("CATALOG_TTL_SECS", defaults.ttl)?,
            retry,
        })
    }

    /// Small cache and fast retries (for development)
    pub fn development() -> Self {
        Self {
            max_entries: 32,
            ttl: Duration::from_secs(60),
            retry: RetryPolicy::new(3, 50),
            ..Self::default()
        }
    }

    /// Cache TTL in whole seconds
    pub fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs()
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
