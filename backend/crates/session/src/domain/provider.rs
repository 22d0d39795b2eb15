//! Identity Provider Trait
//!
//! The external authentication service. The manager only sees this trait.

use crate::domain::entity::session::UserSession;
use crate::domain::value_object::credential::{AuthenticatedUser, Credential};
use crate::error::SessionResult;

/// Identity provider trait
#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Exchange a credential for a confirmed identity.
    /// Fails with `InvalidCredentials` or `ProviderUnavailable`.
    async fn authenticate(&self, credential: &Credential) -> SessionResult<AuthenticatedUser>;

    /// Revoke a session's token on the provider side
    async fn revoke(&self, session: &UserSession) -> SessionResult<()>;
}
