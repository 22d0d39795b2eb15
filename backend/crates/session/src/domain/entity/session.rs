//! User Session Entity
//!
//! A signed-in user, stamped with the epoch it was created in. Anything
//! derived from a session (favorites, pending writes) is only valid while
//! the current epoch equals the session's epoch.

use std::fmt;

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_object::access_token::AccessToken;
use crate::domain::value_object::credential::AuthenticatedUser;

/// Session generation counter, bumped on every sign-in and sign-out
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionEpoch(u64);

impl SessionEpoch {
    pub const INITIAL: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SessionEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed-in user session
#[derive(Debug, Clone)]
pub struct UserSession {
    pub session_id: Uuid,
    pub user_id: UserId,
    pub display_name: String,
    pub email: Option<String>,
    /// Provider token, used as bearer for the remote favorites store
    pub token: AccessToken,
    /// Epoch this session belongs to
    pub epoch: SessionEpoch,
    pub signed_in_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(user: AuthenticatedUser, epoch: SessionEpoch) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id: user.user_id,
            display_name: user.display_name,
            email: user.email,
            token: user.token,
            epoch,
            signed_in_at: Utc::now(),
        }
    }
}

/// Session state machine position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    #[default]
    SignedOut,
    SigningIn,
    SignedIn,
}

/// What the watch channel carries: the current epoch and its session, if any
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub epoch: SessionEpoch,
    pub session: Option<UserSession>,
}

impl SessionSnapshot {
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SignOutReason {
    /// Explicit `sign_out`
    Requested,
    /// A new sign-in replaced the session
    Replaced,
}

/// Session change event for UI streams
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionChange {
    #[serde(rename_all = "camelCase")]
    SignedIn {
        epoch: SessionEpoch,
        user_id: UserId,
        display_name: String,
    },
    #[serde(rename_all = "camelCase")]
    SignedOut {
        epoch: SessionEpoch,
        user_id: UserId,
        reason: SignOutReason,
    },
}

impl SessionChange {
    pub fn epoch(&self) -> SessionEpoch {
        match self {
            SessionChange::SignedIn { epoch, .. } | SessionChange::SignedOut { epoch, .. } => *epoch,
        }
    }

    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            SessionChange::SignedIn { .. } => "signedIn",
            SessionChange::SignedOut { .. } => "signedOut",
        }
    }
}
