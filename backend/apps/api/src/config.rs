//! Server Configuration
//!
//! Settings owned by the binary itself: listen address, CORS origins and
//! the identities accepted by the in-memory identity provider.

use std::net::SocketAddr;

use kernel::id::UserId;
use platform::config::{ConfigError, env_list, env_or};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: [&str; 2] = ["http://localhost:40922", "http://127.0.0.1:40922"];

/// One accepted `(provider, token)` pair and the user it signs in as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevIdentity {
    pub provider: String,
    pub token: String,
    pub user_id: UserId,
    pub display_name: String,
    pub email: Option<String>,
}

impl DevIdentity {
    /// Parse `provider:token:user_id:Display Name[:email]`
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = |message: &str| ConfigError::Invalid {
            key: "DEV_IDENTITIES".to_string(),
            message: format!("{message} in {raw:?}"),
        };

        let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
        let (provider, token, user_id, display_name, email) = match parts.as_slice() {
            [p, t, u, d] => (*p, *t, *u, *d, None),
            [p, t, u, d, e] => (*p, *t, *u, *d, Some(*e).filter(|e| !e.is_empty())),
            _ => return Err(invalid("expected provider:token:user_id:name[:email]")),
        };

        if provider.is_empty() || token.is_empty() || display_name.is_empty() {
            return Err(invalid("empty field"));
        }
        let user_id = UserId::parse(user_id).map_err(|e| invalid(e.message()))?;

        Ok(Self {
            provider: provider.to_string(),
            token: token.to_string(),
            user_id,
            display_name: display_name.to_string(),
            email: email.map(str::to_string),
        })
    }
}

/// Binary configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub dev_identities: Vec<DevIdentity>,
}

impl ServerConfig {
    /// Load from `API_LISTEN_ADDR`, `FRONTEND_ORIGINS` and `DEV_IDENTITIES`
    pub fn from_env() -> Result<Self, ConfigError> {
        let default_addr = DEFAULT_LISTEN_ADDR
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "API_LISTEN_ADDR".to_string(),
                message: e.to_string(),
            })?;

        let mut frontend_origins = env_list("FRONTEND_ORIGINS");
        if frontend_origins.is_empty() {
            frontend_origins = DEFAULT_FRONTEND_ORIGINS.map(str::to_string).to_vec();
        }

        let dev_identities = env_list("DEV_IDENTITIES")
            .iter()
            .map(|raw| DevIdentity::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            listen_addr: env_or("API_LISTEN_ADDR", default_addr)?,
            frontend_origins,
            dev_identities,
        })
    }
}
