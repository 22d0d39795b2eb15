//! Scenario tests for the session crate

#[cfg(test)]
mod support {
    use std::sync::Arc;
    use std::time::Duration;

    use kernel::id::UserId;

    use crate::application::config::SessionConfig;
    use crate::application::manager::SessionManager;
    use crate::domain::value_object::credential::Credential;
    use crate::infra::memory::InMemoryIdentityProvider;

    pub fn provider() -> InMemoryIdentityProvider {
        InMemoryIdentityProvider::new()
            .with_identity(
                "google",
                "alice-token",
                UserId::parse("alice").unwrap(),
                "Alice",
                Some("alice@example.com"),
            )
            .with_identity(
                "google",
                "bob-token",
                UserId::parse("bob").unwrap(),
                "Bob",
                None,
            )
    }

    pub fn manager(provider: InMemoryIdentityProvider) -> Arc<SessionManager<InMemoryIdentityProvider>> {
        let config = SessionConfig {
            provider_timeout: Duration::from_millis(500),
            ..SessionConfig::default()
        };
        Arc::new(SessionManager::new(Arc::new(provider), config))
    }

    pub fn alice() -> Credential {
        Credential::new("google", "alice-token")
    }

    pub fn bob() -> Credential {
        Credential::new("google", "bob-token")
    }
}

#[cfg(test)]
mod manager_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::support::*;
    use crate::application::config::SessionConfig;
    use crate::application::manager::SessionManager;
    use crate::domain::entity::session::{SessionChange, SessionEpoch, SessionStatus, SignOutReason};
    use crate::domain::value_object::credential::Credential;
    use crate::error::SessionError;
    use kernel::error::kind::ErrorKind;

    #[tokio::test]
    async fn test_sign_in_bumps_epoch_and_publishes() {
        let manager = manager(provider());
        let mut watch = manager.subscribe();
        let mut events = manager.events();

        let session = manager.sign_in(alice()).await.unwrap();

        assert_eq!(session.user_id.as_str(), "alice");
        assert_eq!(session.epoch, SessionEpoch::new(1));
        assert_eq!(manager.status(), SessionStatus::SignedIn);

        assert!(watch.has_changed().unwrap());
        let snapshot = watch.borrow_and_update().clone();
        assert_eq!(snapshot.epoch, SessionEpoch::new(1));
        assert_eq!(snapshot.session.unwrap().user_id.as_str(), "alice");

        match events.recv().await.unwrap() {
            SessionChange::SignedIn { epoch, user_id, .. } => {
                assert_eq!(epoch, SessionEpoch::new(1));
                assert_eq!(user_id.as_str(), "alice");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_credentials() {
        let manager = manager(provider());

        let err = manager
            .sign_in(Credential::new("google", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(manager.status(), SessionStatus::SignedOut);
        assert_eq!(manager.epoch(), SessionEpoch::INITIAL);

        let blank = manager.sign_in(Credential::new("google", " ")).await;
        assert!(matches!(blank, Err(SessionError::InvalidCredentials)));
        assert_eq!(manager.provider().authenticate_calls(), 1);
    }

    #[tokio::test]
    async fn test_provider_outage_is_network_error() {
        let provider = provider();
        provider.set_unavailable(true);
        let manager = manager(provider);

        let err = manager.sign_in(alice()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(manager.status(), SessionStatus::SignedOut);
    }

    #[tokio::test]
    async fn test_provider_timeout() {
        let provider = provider();
        provider.set_latency(Duration::from_millis(200));
        let config = SessionConfig {
            provider_timeout: Duration::from_millis(20),
            ..SessionConfig::default()
        };
        let manager = SessionManager::new(Arc::new(provider), config);

        let err = manager.sign_in(alice()).await.unwrap_err();
        assert!(matches!(err, SessionError::ProviderUnavailable(_)));
        assert_eq!(manager.status(), SessionStatus::SignedOut);
    }

    #[tokio::test]
    async fn test_second_sign_in_is_rejected_while_first_outstanding() {
        let provider = provider();
        provider.set_latency(Duration::from_millis(100));
        let manager = manager(provider);

        let first = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.sign_in(alice()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(manager.status(), SessionStatus::SigningIn);

        let err = manager.sign_in(bob()).await.unwrap_err();
        assert!(matches!(err, SessionError::ConcurrentOperation));

        let session = first.await.unwrap().unwrap();
        assert_eq!(session.user_id.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_sign_out_cancels_outstanding_sign_in() {
        let provider = provider();
        provider.set_latency(Duration::from_millis(100));
        let manager = manager(provider);

        let pending = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.sign_in(alice()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        manager.sign_out().await;

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, SessionError::Cancelled));
        assert_eq!(err.kind(), ErrorKind::ConcurrentOperation);
        assert_eq!(manager.status(), SessionStatus::SignedOut);
        assert!(manager.current_session().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_is_local_even_when_revoke_fails() {
        let manager = manager(provider());
        manager.sign_in(alice()).await.unwrap();
        manager.provider().set_revoke_failing(true);

        let epoch = manager.sign_out().await;

        assert_eq!(epoch, SessionEpoch::new(2));
        assert_eq!(manager.status(), SessionStatus::SignedOut);
        assert!(manager.current_session().is_none());
        assert!(matches!(
            manager.require_session(),
            Err(SessionError::NotAuthenticated)
        ));
        assert_eq!(manager.provider().revoked(), 0);
    }

    #[tokio::test]
    async fn test_sign_out_when_signed_out_is_noop() {
        let manager = manager(provider());
        let mut events = manager.events();

        assert_eq!(manager.sign_out().await, SessionEpoch::INITIAL);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sign_in_replaces_current_session() {
        let manager = manager(provider());
        let mut events = manager.events();

        manager.sign_in(alice()).await.unwrap();
        let bob_session = manager.sign_in(bob()).await.unwrap();

        assert_eq!(bob_session.epoch, SessionEpoch::new(3));
        assert_eq!(manager.provider().revoked(), 1);

        let kinds: Vec<SessionChange> = vec![
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
        ];
        assert!(matches!(kinds[0], SessionChange::SignedIn { .. }));
        assert!(matches!(
            kinds[1],
            SessionChange::SignedOut {
                reason: SignOutReason::Replaced,
                ..
            }
        ));
        assert_eq!(kinds[2].epoch(), SessionEpoch::new(3));
    }

    #[tokio::test]
    async fn test_dropped_sign_in_resets_status() {
        let provider = provider();
        provider.set_latency(Duration::from_millis(200));
        let manager = manager(provider);

        let outcome = tokio::time::timeout(Duration::from_millis(20), manager.sign_in(alice())).await;
        assert!(outcome.is_err());
        assert_eq!(manager.status(), SessionStatus::SignedOut);

        // A fresh attempt is not blocked by the abandoned one
        manager.provider().set_latency(Duration::ZERO);
        assert!(manager.sign_in(alice()).await.is_ok());
    }
}

#[cfg(test)]
mod activity_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use kernel::id::UserId;

    use super::support::*;
    use crate::application::config::SessionConfig;
    use crate::application::manager::SessionManager;
    use crate::domain::activity::ActivityLog;
    use crate::domain::entity::session::SessionStatus;
    use crate::domain::value_object::credential::Credential;
    use crate::infra::activity::InMemoryActivityLog;

    fn user(raw: &str) -> UserId {
        UserId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_and_sign_out_are_logged() {
        let manager = manager(provider());

        let session = manager.sign_in(alice()).await.unwrap();
        let open = manager.activity().history(&user("alice")).await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].login_at, session.signed_in_at);
        assert!(open[0].is_open());

        manager.sign_out().await;
        let closed = manager.activity().history(&user("alice")).await.unwrap();
        assert_eq!(closed.len(), 1);
        let logout_at = closed[0].logout_at.unwrap();
        assert!(logout_at >= closed[0].login_at);
    }

    #[tokio::test]
    async fn test_replaced_session_is_closed_in_log() {
        let manager = manager(provider());

        manager.sign_in(alice()).await.unwrap();
        manager.sign_in(bob()).await.unwrap();

        let alice_log = manager.activity().history(&user("alice")).await.unwrap();
        assert_eq!(alice_log.len(), 1);
        assert!(!alice_log[0].is_open());

        let bob_log = manager.activity().history(&user("bob")).await.unwrap();
        assert_eq!(bob_log.len(), 1);
        assert!(bob_log[0].is_open());
    }

    #[tokio::test]
    async fn test_failed_sign_in_is_not_logged() {
        let manager = manager(provider());

        assert!(manager.sign_in(Credential::new("google", "wrong")).await.is_err());
        manager.sign_out().await;

        assert!(manager.activity().history(&user("alice")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_activity_log_failure_does_not_block_session() {
        let activity = Arc::new(InMemoryActivityLog::new());
        activity.set_failing(true);
        let config = SessionConfig {
            provider_timeout: Duration::from_millis(500),
            ..SessionConfig::default()
        };
        let manager =
            SessionManager::with_activity_log(Arc::new(provider()), Arc::clone(&activity), config);

        manager.sign_in(alice()).await.unwrap();
        assert_eq!(manager.status(), SessionStatus::SignedIn);

        manager.sign_out().await;
        assert_eq!(manager.status(), SessionStatus::SignedOut);
        assert!(activity.history(&user("alice")).await.unwrap().is_empty());
    }
}

#[cfg(test)]
mod router_tests {
    use serde_json::{Value, json};

    use super::support::*;
    use crate::presentation::router::session_router;

    async fn serve() -> String {
        let app = session_router(manager(provider()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_sign_in_status_sign_out() {
        let base = serve().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/sign-in"))
            .json(&json!({"provider": "google", "token": "alice-token"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["userId"], "alice");
        assert!(body.get("token").is_none());

        let status: Value = client.get(&base).send().await.unwrap().json().await.unwrap();
        assert_eq!(status["status"], "signedIn");
        assert_eq!(status["epoch"], 1);

        let signed_out: Value = client
            .post(format!("{base}/sign-out"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(signed_out["status"], "signedOut");
        assert!(signed_out["session"].is_null());
    }

    #[tokio::test]
    async fn test_activity_requires_session() {
        let base = serve().await;
        let client = reqwest::Client::new();

        let rejected = client.get(format!("{base}/activity")).send().await.unwrap();
        assert_eq!(rejected.status().as_u16(), 401);

        client
            .post(format!("{base}/sign-in"))
            .json(&json!({"provider": "google", "token": "alice-token"}))
            .send()
            .await
            .unwrap();

        let body: Value = client
            .get(format!("{base}/activity"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["userId"], "alice");
        assert!(entries[0]["loginAt"].is_string());
        assert!(entries[0]["logoutAt"].is_null());
    }

    #[tokio::test]
    async fn test_bad_credentials_are_problem_document() {
        let base = serve().await;

        let response = reqwest::Client::new()
            .post(format!("{base}/sign-in"))
            .json(&json!({"provider": "google", "token": "nope"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["kind"], "AUTH");
    }
}
