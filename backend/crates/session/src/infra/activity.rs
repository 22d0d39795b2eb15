//! In-Memory Activity Log

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::activity::ActivityLog;
use crate::domain::entity::activity::ActivityEntry;
use crate::error::{SessionError, SessionResult};

/// Activity log kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryActivityLog {
    entries: Mutex<HashMap<UserId, Vec<ActivityEntry>>>,
    failing: AtomicBool,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<UserId, Vec<ActivityEntry>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> SessionResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SessionError::Internal("activity log unavailable".to_string()));
        }
        Ok(())
    }
}

impl ActivityLog for InMemoryActivityLog {
    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> SessionResult<()> {
        self.check_writable()?;

        let mut entries = self.entries();
        let log = entries.entry(user_id.clone()).or_default();
        if log.last_mut().is_some_and(|last| last.close(at)) {
            tracing::debug!(user_id = %user_id, "Closed dangling activity entry");
        }
        log.push(ActivityEntry::opened(user_id.clone(), at));
        Ok(())
    }

    async fn record_logout(&self, user_id: &UserId, at: DateTime<Utc>) -> SessionResult<()> {
        self.check_writable()?;

        if let Some(last) = self.entries().get_mut(user_id).and_then(|log| log.last_mut()) {
            last.close(at);
        }
        Ok(())
    }

    async fn history(&self, user_id: &UserId) -> SessionResult<Vec<ActivityEntry>> {
        Ok(self.entries().get(user_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn alice() -> UserId {
        UserId::parse("alice").unwrap()
    }

    #[tokio::test]
    async fn test_login_closes_previous_open_entry() {
        let log = InMemoryActivityLog::new();
        let t0 = Utc::now();
        let t1 = t0 + Duration::minutes(5);

        log.record_login(&alice(), t0).await.unwrap();
        log.record_login(&alice(), t1).await.unwrap();

        let history = log.history(&alice()).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].logout_at, Some(t1));
        assert!(history[1].is_open());
        assert_eq!(history[1].login_at, t1);
    }

    #[tokio::test]
    async fn test_logout_closes_only_open_entry() {
        let log = InMemoryActivityLog::new();
        let t0 = Utc::now();
        let t1 = t0 + Duration::minutes(1);
        let t2 = t0 + Duration::minutes(2);

        // Nothing to close yet
        log.record_logout(&alice(), t0).await.unwrap();
        assert!(log.history(&alice()).await.unwrap().is_empty());

        log.record_login(&alice(), t0).await.unwrap();
        log.record_logout(&alice(), t1).await.unwrap();
        log.record_logout(&alice(), t2).await.unwrap();

        let history = log.history(&alice()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].logout_at, Some(t1));
    }

    #[tokio::test]
    async fn test_failing_log_rejects_writes() {
        let log = InMemoryActivityLog::new();
        log.set_failing(true);

        let err = log.record_login(&alice(), Utc::now()).await.unwrap_err();
        assert!(matches!(err, SessionError::Internal(_)));
        assert!(log.history(&alice()).await.unwrap().is_empty());
    }
}
