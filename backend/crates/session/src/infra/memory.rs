//! In-Memory Identity Provider
//!
//! Accepts a fixed set of `(provider, secret)` pairs. Used by the
//! development server and by tests, which can also inject latency and
//! outages.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use kernel::id::UserId;
use uuid::Uuid;

use crate::domain::entity::session::UserSession;
use crate::domain::provider::IdentityProvider;
use crate::domain::value_object::access_token::AccessToken;
use crate::domain::value_object::credential::{AuthenticatedUser, Credential};
use crate::error::{SessionError, SessionResult};

#[derive(Debug, Clone)]
struct Identity {
    user_id: UserId,
    display_name: String,
    email: Option<String>,
}

/// In-memory identity provider
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    identities: Mutex<HashMap<(String, String), Identity>>,
    latency_ms: AtomicU64,
    unavailable: AtomicBool,
    revoke_failing: AtomicBool,
    authenticate_calls: AtomicUsize,
    revoked: AtomicUsize,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a `(provider, secret)` pair that signs in as `user_id`
    pub fn with_identity(
        self,
        provider: &str,
        secret: &str,
        user_id: UserId,
        display_name: &str,
        email: Option<&str>,
    ) -> Self {
        self.add_identity(provider, secret, user_id, display_name, email);
        self
    }

    pub fn add_identity(
        &self,
        provider: &str,
        secret: &str,
        user_id: UserId,
        display_name: &str,
        email: Option<&str>,
    ) {
        let identity = Identity {
            user_id,
            display_name: display_name.to_string(),
            email: email.map(str::to_string),
        };
        self.identities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((provider.trim().to_ascii_lowercase(), secret.to_string()), identity);
    }

    /// Delay every provider call
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Simulate a provider outage
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make `revoke` fail
    pub fn set_revoke_failing(&self, failing: bool) {
        self.revoke_failing.store(failing, Ordering::SeqCst);
    }

    pub fn authenticate_calls(&self) -> usize {
        self.authenticate_calls.load(Ordering::SeqCst)
    }

    /// Successful revokes so far
    pub fn revoked(&self) -> usize {
        self.revoked.load(Ordering::SeqCst)
    }

    async fn simulate_network(&self) -> SessionResult<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SessionError::ProviderUnavailable(
                "identity provider is offline".to_string(),
            ));
        }
        Ok(())
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    async fn authenticate(&self, credential: &Credential) -> SessionResult<AuthenticatedUser> {
        self.authenticate_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_network().await?;

        let identity = self
            .identities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(credential.provider.clone(), credential.secret().to_string()))
            .cloned()
            .ok_or(SessionError::InvalidCredentials)?;

        Ok(AuthenticatedUser {
            user_id: identity.user_id,
            display_name: identity.display_name,
            email: identity.email,
            token: AccessToken::new(format!("mem-{}", Uuid::new_v4().simple())),
        })
    }

    async fn revoke(&self, _session: &UserSession) -> SessionResult<()> {
        self.simulate_network().await?;
        if self.revoke_failing.load(Ordering::SeqCst) {
            return Err(SessionError::ProviderUnavailable(
                "revoke endpoint returned 503".to_string(),
            ));
        }
        self.revoked.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
