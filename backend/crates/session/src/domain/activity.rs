//! Activity Log Trait
//!
//! Per-user history of logins and logouts. The manager records into it;
//! a failed write never fails the sign-in or sign-out that caused it.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::entity::activity::ActivityEntry;
use crate::error::SessionResult;

/// Activity log trait
#[trait_variant::make(ActivityLog: Send)]
pub trait LocalActivityLog {
    /// Open a new entry, closing the user's previous entry if still open
    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> SessionResult<()>;

    /// Close the user's open entry. No-op when nothing is open.
    async fn record_logout(&self, user_id: &UserId, at: DateTime<Utc>) -> SessionResult<()>;

    /// Entries for one user, oldest first
    async fn history(&self, user_id: &UserId) -> SessionResult<Vec<ActivityEntry>>;
}
