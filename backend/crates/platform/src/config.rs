//! Environment Configuration Helpers
//!
//! Every crate builds its config struct from environment variables
//! (optionally loaded from `.env` by the binary). These helpers keep the
//! parsing rules in one place.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Error while reading configuration
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// Read a variable, treating blank values as unset
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a variable that must be present
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env_string(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

/// Read and parse a variable, falling back to `default` when unset
pub fn env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env_string(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

/// Read a whole number of seconds as a [`Duration`]
pub fn env_duration_secs(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    match env_string(key) {
        Some(raw) => parse_value::<u64>(key, &raw).map(Duration::from_secs),
        None => Ok(default),
    }
}

/// Read a comma-separated list (empty when unset)
pub fn env_list(key: &str) -> Vec<String> {
    env_string(key).map(|raw| parse_list(&raw)).unwrap_or_default()
}

/// Parse a single value, naming the key in the error
pub fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Split a comma-separated list, dropping blank items
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
