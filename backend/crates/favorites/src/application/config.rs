//! Application Configuration
//!
//! Configuration for the favorites synchronizer and its remote store.

use platform::config::{ConfigError, env_duration_secs, env_or, env_string};
use platform::http::HttpClientConfig;
use platform::retry::RetryPolicy;

/// Favorites configuration
#[derive(Debug, Clone)]
pub struct FavoritesConfig {
    /// Remote store base URL; the in-memory store is used when unset
    pub store_url: Option<String>,
    /// HTTP client settings for the remote store
    pub http: HttpClientConfig,
    /// Retry budget for one remote write
    pub retry: RetryPolicy,
    /// Buffered favorites events per subscriber
    pub event_capacity: usize,
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            http: HttpClientConfig::default(),
            retry: RetryPolicy::default(),
            event_capacity: 128,
        }
    }
}

impl FavoritesConfig {
    /// Load from `FAVORITES_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let http = HttpClientConfig {
            timeout: env_duration_secs("FAVORITES_REQUEST_TIMEOUT_SECS", defaults.http.timeout)?,
            ..defaults.http.clone()
        };

        let retry = RetryPolicy {
            max_attempts: env_or("FAVORITES_RETRY_ATTEMPTS", defaults.retry.max_attempts)?,
            ..defaults.retry.clone()
        };

        Ok(Self {
            store_url: env_string("FAVORITES_STORE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            http,
            retry,
            event_capacity: env_or("FAVORITES_EVENT_CAPACITY", defaults.event_capacity)?,
        })
    }

    /// In-memory store and fast retries (for development)
    pub fn development() -> Self {
        Self {
            retry: RetryPolicy::new(3, 50),
            ..Self::default()
        }
    }
}
