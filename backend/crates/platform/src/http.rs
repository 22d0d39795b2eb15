//! HTTP client utilities
//!
//! Client construction shared by the catalog and favorites-store adapters,
//! plus the API key ring used to spread requests over several provider keys.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::StatusCode;

use crate::crypto::fingerprint;

/// Error while preparing an HTTP client
#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpSetupError {
    #[error("At least one API key is required")]
    NoApiKeys,

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,
    /// User-Agent header sent upstream
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            user_agent: concat!("moviedeck/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Build a `reqwest::Client` from the shared settings
pub fn build_client(config: &HttpClientConfig) -> Result<reqwest::Client, HttpSetupError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| HttpSetupError::Client(e.to_string()))
}

/// Whether an upstream status is worth retrying
pub fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

/// A key handed out by [`ApiKeyRing`]
#[derive(Clone, Copy)]
pub struct ApiKey<'a> {
    /// Position in the ring, passed back to [`ApiKeyRing::rotate_after`]
    pub index: usize,
    pub value: &'a str,
}

impl fmt::Debug for ApiKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("index", &self.index)
            .field("fingerprint", &fingerprint(self.value))
            .finish()
    }
}

/// Round-robin set of provider API keys
///
/// When the provider answers 429 for the current key, callers rotate to the
/// next one. Rotation is keyed on the index that failed, so concurrent
/// requests hitting the same limit advance the ring only once.
pub struct ApiKeyRing {
    keys: Vec<String>,
    current: AtomicUsize,
}

impl ApiKeyRing {
    pub fn new(keys: Vec<String>) -> Result<Self, HttpSetupError> {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        if keys.is_empty() {
            return Err(HttpSetupError::NoApiKeys);
        }

        tracing::debug!(keys = keys.len(), "API key ring initialized");

        Ok(Self {
            keys,
            current: AtomicUsize::new(0),
        })
    }

    /// Key currently in use
    pub fn current(&self) -> ApiKey<'_> {
        let index = self.current.load(Ordering::Acquire) % self.keys.len();
        ApiKey {
            index,
            value: &self.keys[index],
        }
    }

    /// Move past `failed_index` (if nobody else already did) and return the new key
    pub fn rotate_after(&self, failed_index: usize) -> ApiKey<'_> {
        let next = (failed_index + 1) % self.keys.len();
        if self
            .current
            .compare_exchange(failed_index, next, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            tracing::info!(
                from = failed_index,
                to = next,
                key = %fingerprint(&self.keys[next]),
                "Rotated to next API key"
            );
        }
        self.current()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for ApiKeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyRing")
            .field("keys", &self.keys.len())
            .field("current", &self.current.load(Ordering::Relaxed))
            .finish()
    }
}
