//! Activity Entry Entity
//!
//! One login/logout pair in a user's activity log. An entry stays open
//! until a logout, or the next login, closes it.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};

/// Login/logout pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub user_id: UserId,
    pub login_at: DateTime<Utc>,
    pub logout_at: Option<DateTime<Utc>>,
}

impl ActivityEntry {
    pub fn opened(user_id: UserId, login_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            login_at,
            logout_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.logout_at.is_none()
    }

    /// Close an open entry; closed entries keep their first logout time
    pub fn close(&mut self, at: DateTime<Utc>) -> bool {
        if !self.is_open() {
            return false;
        }
        self.logout_at = Some(at);
        true
    }
}
