//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::activity::ActivityEntry;
use crate::domain::entity::session::{SessionEpoch, SessionStatus, UserSession};

// ============================================================================
// Sign In
// ============================================================================

/// Sign in request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    /// Provider name (e.g. `google`)
    pub provider: String,
    /// Token from the provider's own sign-in flow
    pub token: String,
}

/// Session as exposed to the UI (no token)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub user_id: UserId,
    pub display_name: String,
    pub email: Option<String>,
    pub epoch: SessionEpoch,
    pub signed_in_at: DateTime<Utc>,
}

impl From<&UserSession> for SessionView {
    fn from(session: &UserSession) -> Self {
        Self {
            session_id: session.session_id,
            user_id: session.user_id.clone(),
            display_name: session.display_name.clone(),
            email: session.email.clone(),
            epoch: session.epoch,
            signed_in_at: session.signed_in_at,
        }
    }
}

// ============================================================================
// Session Status
// ============================================================================

/// Session status response (also returned by sign-out)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub status: SessionStatus,
    pub epoch: SessionEpoch,
    pub session: Option<SessionView>,
}

// ============================================================================
// Activity
// ============================================================================

/// Login/logout history of the signed-in user, oldest first
#[derive(Debug, Clone, Serialize)]
pub struct ActivityResponse {
    pub entries: Vec<ActivityEntry>,
}
