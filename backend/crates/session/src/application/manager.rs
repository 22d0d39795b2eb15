//! Session Manager
//!
//! Owns the single current session and its state machine:
//!
//! ```text
//! SignedOut -> SigningIn -> SignedIn -> SignedOut
//!                  |
//!                  +-> SignedOut (failure or cancellation)
//! ```
//!
//! Transitions happen under one std mutex that is never held across an
//! `.await`. The provider call runs unlocked; its answer is only applied if
//! the attempt id it was started with is still current, so a sign-out that
//! lands in between wins.
//!
//! Logins and logouts are appended to an [`ActivityLog`] after the state
//! change; a failed write is logged and otherwise ignored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tokio::time::error::Elapsed;

use crate::application::config::SessionConfig;
use crate::domain::activity::ActivityLog;
use crate::domain::entity::session::{
    SessionChange, SessionEpoch, SessionSnapshot, SessionStatus, SignOutReason, UserSession,
};
use crate::domain::provider::IdentityProvider;
use crate::domain::value_object::credential::Credential;
use crate::error::{SessionError, SessionResult};
use crate::infra::activity::InMemoryActivityLog;

#[derive(Debug, Default)]
struct SessionState {
    status: SessionStatus,
    session: Option<UserSession>,
    epoch: SessionEpoch,
    /// Id of the newest sign-in attempt
    attempt: u64,
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resets `SigningIn` if the sign-in future is dropped before it finishes
struct PendingAttempt<'a> {
    state: &'a Mutex<SessionState>,
    attempt: u64,
}

impl Drop for PendingAttempt<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        if state.attempt == self.attempt && state.status == SessionStatus::SigningIn {
            state.status = SessionStatus::SignedOut;
            tracing::debug!(attempt = self.attempt, "Abandoned sign-in reset");
        }
    }
}

fn report_activity(
    recorded: Result<SessionResult<()>, Elapsed>,
    session: &UserSession,
    event: &'static str,
) {
    match recorded {
        Ok(Ok(())) => tracing::trace!(user_id = %session.user_id, event, "Activity recorded"),
        Ok(Err(e)) => {
            tracing::warn!(user_id = %session.user_id, event, error = %e, "Failed to record activity");
        }
        Err(_) => {
            tracing::warn!(user_id = %session.user_id, event, "Recording activity timed out");
        }
    }
}

/// Session manager
pub struct SessionManager<P, A = InMemoryActivityLog>
where
    P: IdentityProvider,
    A: ActivityLog,
{
    provider: Arc<P>,
    activity: Arc<A>,
    config: SessionConfig,
    state: Mutex<SessionState>,
    snapshot: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<SessionChange>,
}

impl<P> SessionManager<P>
where
    P: IdentityProvider,
{
    /// Manager with a process-local activity log
    pub fn new(provider: Arc<P>, config: SessionConfig) -> Self {
        Self::with_activity_log(provider, Arc::new(InMemoryActivityLog::new()), config)
    }
}

impl<P, A> SessionManager<P, A>
where
    P: IdentityProvider,
    A: ActivityLog,
{
    pub fn with_activity_log(provider: Arc<P>, activity: Arc<A>, config: SessionConfig) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::default());
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            provider,
            activity,
            config,
            state: Mutex::new(SessionState::default()),
            snapshot,
            events,
        }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn activity(&self) -> &Arc<A> {
        &self.activity
    }

    /// Sign in with a provider credential.
    ///
    /// An existing session is ended first. Fails with `ConcurrentOperation`
    /// while another sign-in is outstanding and with `Cancelled` when a
    /// sign-out lands before the provider answers.
    pub async fn sign_in(&self, credential: Credential) -> SessionResult<UserSession> {
        if credential.is_blank() {
            return Err(SessionError::InvalidCredentials);
        }

        let (attempt, replaced) = {
            let mut state = lock(&self.state);
            if state.status == SessionStatus::SigningIn {
                return Err(SessionError::ConcurrentOperation);
            }

            let replaced = self.end_session(&mut state, SignOutReason::Replaced);
            state.status = SessionStatus::SigningIn;
            state.attempt += 1;
            (state.attempt, replaced)
        };
        let _pending = PendingAttempt {
            state: &self.state,
            attempt,
        };

        if let Some(previous) = replaced {
            self.record_logout(&previous).await;
            self.revoke_remote(&previous).await;
        }

        tracing::debug!(provider = %credential.provider, attempt, "Authenticating");
        let timeout = self.config.provider_timeout;
        let result = match tokio::time::timeout(timeout, self.provider.authenticate(&credential))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SessionError::ProviderUnavailable(format!(
                "no answer within {timeout:?}"
            ))),
        };

        let session = {
            let mut state = lock(&self.state);
            if state.attempt != attempt || state.status != SessionStatus::SigningIn {
                tracing::info!(
                    provider = %credential.provider,
                    attempt,
                    "Discarding provider answer for cancelled sign-in"
                );
                return Err(SessionError::Cancelled);
            }

            let user = match result {
                Ok(user) => user,
                Err(e) => {
                    state.status = SessionStatus::SignedOut;
                    return Err(e);
                }
            };

            state.epoch = state.epoch.next();
            let session = UserSession::new(user, state.epoch);
            state.status = SessionStatus::SignedIn;
            state.session = Some(session.clone());

            self.publish(
                &state,
                SessionChange::SignedIn {
                    epoch: session.epoch,
                    user_id: session.user_id.clone(),
                    display_name: session.display_name.clone(),
                },
            );
            session
        };

        self.record_login(&session).await;
        tracing::info!(
            user_id = %session.user_id,
            epoch = %session.epoch,
            token = %session.token.fingerprint(),
            "Signed in"
        );

        Ok(session)
    }

    /// Sign out. Always succeeds locally; returns the resulting epoch.
    ///
    /// Cancels an outstanding sign-in. The provider-side revoke runs after
    /// the local state is cleared and its failure is only logged.
    pub async fn sign_out(&self) -> SessionEpoch {
        let (ended, epoch) = {
            let mut state = lock(&self.state);
            if state.status == SessionStatus::SigningIn {
                state.attempt += 1;
                state.status = SessionStatus::SignedOut;
                tracing::info!("Outstanding sign-in cancelled by sign-out");
            }
            let ended = self.end_session(&mut state, SignOutReason::Requested);
            (ended, state.epoch)
        };

        if let Some(session) = ended {
            self.record_logout(&session).await;
            self.revoke_remote(&session).await;
        }
        epoch
    }

    pub fn current_session(&self) -> Option<UserSession> {
        lock(&self.state).session.clone()
    }

    /// Current session or `NotAuthenticated`
    pub fn require_session(&self) -> SessionResult<UserSession> {
        self.current_session().ok_or(SessionError::NotAuthenticated)
    }

    pub fn status(&self) -> SessionStatus {
        lock(&self.state).status
    }

    pub fn epoch(&self) -> SessionEpoch {
        lock(&self.state).epoch
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Epoch/session watch, for dependents that must drop stale work
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    /// Sign-in/sign-out event stream
    pub fn events(&self) -> broadcast::Receiver<SessionChange> {
        self.events.subscribe()
    }

    /// End the current session (if any) under the state lock
    fn end_session(
        &self,
        state: &mut SessionState,
        reason: SignOutReason,
    ) -> Option<UserSession> {
        let session = state.session.take()?;
        state.epoch = state.epoch.next();
        state.status = SessionStatus::SignedOut;

        self.publish(
            state,
            SessionChange::SignedOut {
                epoch: state.epoch,
                user_id: session.user_id.clone(),
                reason,
            },
        );

        tracing::info!(
            user_id = %session.user_id,
            epoch = %state.epoch,
            ?reason,
            "Signed out"
        );
        Some(session)
    }

    fn publish(&self, state: &SessionState, change: SessionChange) {
        self.snapshot.send_replace(SessionSnapshot {
            epoch: state.epoch,
            session: state.session.clone(),
        });
        // No subscribers is fine
        let _ = self.events.send(change);
    }

    async fn record_login(&self, session: &UserSession) {
        let recorded = tokio::time::timeout(
            self.config.provider_timeout,
            self.activity.record_login(&session.user_id, session.signed_in_at),
        )
        .await;
        report_activity(recorded, session, "login");
    }

    async fn record_logout(&self, session: &UserSession) {
        let recorded = tokio::time::timeout(
            self.config.provider_timeout,
            self.activity.record_logout(&session.user_id, Utc::now()),
        )
        .await;
        report_activity(recorded, session, "logout");
    }

    async fn revoke_remote(&self, session: &UserSession) {
        let timeout = self.config.provider_timeout;
        match tokio::time::timeout(timeout, self.provider.revoke(session)).await {
            Ok(Ok(())) => {
                tracing::debug!(user_id = %session.user_id, "Provider session revoked");
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    user_id = %session.user_id,
                    error = %e,
                    "Provider revoke failed; session already ended locally"
                );
            }
            Err(_) => {
                tracing::warn!(
                    user_id = %session.user_id,
                    timeout_ms = timeout.as_millis() as u64,
                    "Provider revoke timed out; session already ended locally"
                );
            }
        }
    }
}

impl<P, A> std::fmt::Debug for SessionManager<P, A>
where
    P: IdentityProvider,
    A: ActivityLog,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("SessionManager")
            .field("status", &state.status)
            .field("epoch", &state.epoch)
            .finish()
    }
}
