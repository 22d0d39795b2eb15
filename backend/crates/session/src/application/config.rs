//! Application Configuration
//!
//! Configuration for the session manager.

use std::time::Duration;

use platform::config::{ConfigError, env_duration_secs, env_or};

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Upper bound for one provider call (authenticate or revoke)
    pub provider_timeout: Duration,
    /// Buffered session change events per subscriber
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(10),
            event_capacity: 64,
        }
    }
}

impl SessionConfig {
    /// Load from `SESSION_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            provider_timeout: env_duration_secs(
                "SESSION_PROVIDER_TIMEOUT_SECS",
                defaults.provider_timeout,
            )?,
            event_capacity: env_or("SESSION_EVENT_CAPACITY", defaults.event_capacity)?,
        })
    }

    /// Short provider timeout (for development)
    pub fn development() -> Self {
        Self {
            provider_timeout: Duration::from_secs(5),
            ..Self::default()
        }
    }
}
