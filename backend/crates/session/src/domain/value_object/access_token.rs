//! Access Token Value Object
//!
//! Bearer token issued by the identity provider. Zeroized on drop and never
//! printed; logs carry its fingerprint instead.

use std::fmt;

use platform::crypto::fingerprint;
use zeroize::Zeroizing;

#[derive(Clone)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Raw token, for the `Authorization` header only
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Short, non-reversible identifier safe for logs
    pub fn fingerprint(&self) -> String {
        fingerprint(self.expose())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken({})", self.fingerprint())
    }
}
