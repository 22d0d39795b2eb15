//! Credential Value Objects
//!
//! `Credential` is what the UI hands in (an opaque token from the provider's
//! own sign-in flow). `AuthenticatedUser` is what the provider hands back.

use std::fmt;

use kernel::id::UserId;
use zeroize::Zeroizing;

use crate::domain::value_object::access_token::AccessToken;

/// Opaque provider credential
pub struct Credential {
    /// Provider name (e.g. `google`)
    pub provider: String,
    secret: Zeroizing<String>,
}

impl Credential {
    pub fn new(provider: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            provider: provider.into().trim().to_ascii_lowercase(),
            secret: Zeroizing::new(secret.into()),
        }
    }

    pub fn secret(&self) -> &str {
        self.secret.as_str()
    }

    /// Blank provider or secret can never authenticate
    pub fn is_blank(&self) -> bool {
        self.provider.is_empty() || self.secret.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("provider", &self.provider)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Identity confirmed by the provider
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub display_name: String,
    pub email: Option<String>,
    pub token: AccessToken,
}
