//! Scenario tests for the favorites crate

#[cfg(test)]
mod support {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use catalog::MovieRecord;
    use kernel::id::{MovieId, UserId};
    use platform::retry::RetryPolicy;
    use session::{Credential, InMemoryIdentityProvider, SessionConfig, SessionManager};
    use tokio::sync::broadcast;

    use crate::application::config::FavoritesConfig;
    use crate::application::synchronizer::FavoritesSynchronizer;
    use crate::domain::entity::event::FavoritesEvent;
    use crate::domain::repository::MovieLookup;
    use crate::error::FavoritesResult;
    use crate::infra::memory::InMemoryFavoritesStore;

    /// Catalog stand-in with a fixed set of movies
    #[derive(Debug, Default)]
    pub struct FakeLookup {
        movies: HashMap<MovieId, MovieRecord>,
        calls: AtomicUsize,
    }

    impl FakeLookup {
        pub fn with_movies(movies: impl IntoIterator<Item = MovieRecord>) -> Self {
            Self {
                movies: movies.into_iter().map(|m| (m.id.clone(), m)).collect(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl MovieLookup for FakeLookup {
        async fn lookup(&self, id: &MovieId) -> FavoritesResult<Option<MovieRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.movies.get(id).cloned())
        }
    }

    pub struct Harness {
        pub sessions: Arc<SessionManager<InMemoryIdentityProvider>>,
        pub store: Arc<InMemoryFavoritesStore>,
        pub lookup: Arc<FakeLookup>,
        pub sync: Arc<FavoritesSynchronizer<InMemoryFavoritesStore, FakeLookup>>,
    }

    pub fn movie(id: &str, title: &str) -> MovieRecord {
        MovieRecord::new(MovieId::parse(id).unwrap(), title)
    }

    pub fn inception() -> MovieRecord {
        movie("27205", "Inception").with_release_year(2010)
    }

    pub fn arrival() -> MovieRecord {
        movie("329865", "Arrival").with_release_year(2016)
    }

    pub fn heat() -> MovieRecord {
        movie("949", "Heat").with_release_year(1995)
    }

    pub fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    pub fn harness(retry: RetryPolicy) -> Harness {
        let provider = InMemoryIdentityProvider::new()
            .with_identity("google", "alice-token", user("alice"), "Alice", None)
            .with_identity("google", "bob-token", user("bob"), "Bob", None);
        let sessions = Arc::new(SessionManager::new(
            Arc::new(provider),
            SessionConfig::development(),
        ));

        let store = Arc::new(InMemoryFavoritesStore::new());
        let lookup = Arc::new(FakeLookup::with_movies([inception(), arrival(), heat()]));
        let config = FavoritesConfig {
            retry,
            ..FavoritesConfig::default()
        };
        let sync = Arc::new(FavoritesSynchronizer::new(
            Arc::clone(&store),
            Arc::clone(&lookup),
            sessions.subscribe(),
            config,
        ));

        Harness {
            sessions,
            store,
            lookup,
            sync,
        }
    }

    pub fn alice() -> Credential {
        Credential::new("google", "alice-token")
    }

    pub fn bob() -> Credential {
        Credential::new("google", "bob-token")
    }

    /// Wait for the first event matching `pred`
    pub async fn wait_for_event(
        events: &mut broadcast::Receiver<FavoritesEvent>,
        pred: impl Fn(&FavoritesEvent) -> bool,
    ) -> FavoritesEvent {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let event = events.recv().await.unwrap();
                if pred(&event) {
                    return event;
                }
            }
        })
        .await
        .expect("event not seen in time")
    }
}

#[cfg(test)]
mod synchronizer_tests {
    use std::time::Duration;

    use platform::retry::RetryPolicy;
    use session::SessionEpoch;

    use super::support::*;
    use crate::domain::entity::event::FavoritesEvent;
    use crate::domain::entity::favorite::{AddOutcome, MutationKind, RemoveOutcome, SyncState};
    use crate::error::FavoritesError;
    use kernel::error::kind::ErrorKind;

    #[tokio::test]
    async fn test_signed_out_operations_are_rejected() {
        let h = harness(RetryPolicy::immediate(3));

        let err = h.sync.add_favorite(&inception().id).await.unwrap_err();
        assert!(matches!(err, FavoritesError::NotAuthenticated));
        assert_eq!(err.kind(), ErrorKind::NotAuthenticated);

        assert!(matches!(
            h.sync.list_favorites().await,
            Err(FavoritesError::NotAuthenticated)
        ));
        assert!(h.store.write_log().is_empty());
        assert_eq!(h.lookup.calls(), 0);
    }

    #[tokio::test]
    async fn test_add_and_remove() {
        let h = harness(RetryPolicy::immediate(3));
        h.sessions.sign_in(alice()).await.unwrap();

        let outcome = h.sync.add_favorite(&inception().id).await.unwrap();
        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(h.sync.list_favorites().await.unwrap(), vec![inception()]);
        assert_eq!(h.store.favorites_of(&user("alice")), vec![inception().id]);

        let outcome = h.sync.remove_favorite(&inception().id).await.unwrap();
        assert_eq!(outcome, RemoveOutcome::Removed);
        assert!(h.sync.list_favorites().await.unwrap().is_empty());
        assert!(h.store.favorites_of(&user("alice")).is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_are_reported_without_writes() {
        let h = harness(RetryPolicy::immediate(3));
        h.sessions.sign_in(alice()).await.unwrap();

        h.sync.add_favorite(&heat().id).await.unwrap();
        let again = h.sync.add_favorite(&heat().id).await.unwrap();
        assert_eq!(again, AddOutcome::AlreadyPresent);

        let missing = h.sync.remove_favorite(&arrival().id).await.unwrap();
        assert_eq!(missing, RemoveOutcome::NotPresent);

        assert_eq!(h.store.write_log().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_movie() {
        let h = harness(RetryPolicy::immediate(3));
        h.sessions.sign_in(alice()).await.unwrap();

        let unknown = movie("404404", "Nope").id;
        let err = h.sync.add_favorite(&unknown).await.unwrap_err();
        assert!(matches!(err, FavoritesError::MovieNotFound(ref id) if *id == unknown));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(h.store.write_log().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_title() {
        let h = harness(RetryPolicy::immediate(3));
        h.store.seed(&user("alice"), [inception(), heat()]);
        h.sessions.sign_in(alice()).await.unwrap();

        h.sync.add_favorite(&arrival().id).await.unwrap();

        let titles: Vec<String> = h
            .sync
            .list_favorites()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["Arrival", "Heat", "Inception"]);
    }

    #[tokio::test]
    async fn test_seeded_favorites_skip_lookup() {
        let h = harness(RetryPolicy::immediate(3));
        h.store.seed(&user("alice"), [heat()]);
        h.sessions.sign_in(alice()).await.unwrap();

        let outcome = h.sync.remove_favorite(&heat().id).await.unwrap();
        assert_eq!(outcome, RemoveOutcome::Removed);
        assert_eq!(h.lookup.calls(), 0);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let h = harness(RetryPolicy::immediate(3));
        h.sessions.sign_in(alice()).await.unwrap();
        h.store.fail_next_writes(2);

        let outcome = h.sync.add_favorite(&inception().id).await.unwrap();
        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(h.store.write_log().len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_roll_back() {
        let h = harness(RetryPolicy::immediate(3));
        h.sessions.sign_in(alice()).await.unwrap();
        let mut events = h.sync.events();
        h.store.fail_next_writes(3);

        let err = h.sync.add_favorite(&inception().id).await.unwrap_err();
        assert!(matches!(err, FavoritesError::Sync { ref movie_id, .. } if *movie_id == inception().id));
        assert_eq!(err.kind(), ErrorKind::Sync);

        assert!(h.sync.list_favorites().await.unwrap().is_empty());
        let entries = h.sync.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].present);
        assert_eq!(entries[0].sync, SyncState::RolledBack);

        let event = wait_for_event(&mut events, |e| {
            matches!(e, FavoritesEvent::RolledBack { .. })
        })
        .await;
        assert_eq!(
            event,
            FavoritesEvent::RolledBack {
                epoch: SessionEpoch::new(1),
                movie_id: inception().id,
                mutation: MutationKind::Add,
            }
        );

        // The store is healthy again
        let outcome = h.sync.add_favorite(&inception().id).await.unwrap();
        assert_eq!(outcome, AddOutcome::Added);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let h = harness(RetryPolicy::immediate(3));
        h.store.seed(&user("alice"), [heat()]);
        h.sessions.sign_in(alice()).await.unwrap();
        h.store.set_rejecting(true);

        let err = h.sync.remove_favorite(&heat().id).await.unwrap_err();
        assert!(matches!(err, FavoritesError::Sync { .. }));
        // Removal rolled back: still a favorite
        assert_eq!(h.sync.list_favorites().await.unwrap(), vec![heat()]);
    }

    #[tokio::test]
    async fn test_same_movie_mutations_keep_submission_order() {
        let h = harness(RetryPolicy::immediate(3));
        h.sessions.sign_in(alice()).await.unwrap();
        h.store.set_write_latency(Duration::from_millis(30));
        let mut events = h.sync.events();

        let sync = h.sync.clone();
        let add = tokio::spawn(async move { sync.add_favorite(&inception().id).await });
        wait_for_event(&mut events, |e| matches!(e, FavoritesEvent::Added { .. })).await;

        // Submitted while the add is still in flight
        let removed = h.sync.remove_favorite(&inception().id).await.unwrap();
        assert_eq!(removed, RemoveOutcome::Removed);
        assert_eq!(add.await.unwrap().unwrap(), AddOutcome::Added);

        let log: Vec<MutationKind> = h.store.write_log().into_iter().map(|(_, k, _)| k).collect();
        assert_eq!(log, vec![MutationKind::Add, MutationKind::Remove]);
        assert!(h.store.favorites_of(&user("alice")).is_empty());
        assert!(h.sync.entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_change_discards_previous_users_write() {
        let h = harness(RetryPolicy::immediate(3));
        h.store.seed(&user("bob"), [heat()]);
        h.sessions.sign_in(alice()).await.unwrap();
        h.store.set_write_latency(Duration::from_millis(200));
        let mut events = h.sync.events();

        let sync = h.sync.clone();
        let alice_add = tokio::spawn(async move { sync.add_favorite(&inception().id).await });
        wait_for_event(&mut events, |e| matches!(e, FavoritesEvent::Added { .. })).await;

        h.sessions.sign_out().await;
        h.sessions.sign_in(bob()).await.unwrap();

        let err = alice_add.await.unwrap().unwrap_err();
        assert!(matches!(err, FavoritesError::Discarded));

        assert_eq!(h.sync.list_favorites().await.unwrap(), vec![heat()]);
        assert_eq!(h.sync.epoch(), SessionEpoch::new(3));

        // Give an abandoned write time to land, if it were going to
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(h.store.favorites_of(&user("alice")).is_empty());
        assert_eq!(h.sync.list_favorites().await.unwrap(), vec![heat()]);
    }

    #[tokio::test]
    async fn test_sign_out_clears_local_set() {
        let h = harness(RetryPolicy::immediate(3));
        h.sessions.sign_in(alice()).await.unwrap();
        h.sync.add_favorite(&arrival().id).await.unwrap();

        h.sessions.sign_out().await;
        assert!(matches!(
            h.sync.entries().await,
            Err(FavoritesError::NotAuthenticated)
        ));

        // Signing back in reloads from the store
        h.sessions.sign_in(alice()).await.unwrap();
        assert_eq!(h.sync.list_favorites().await.unwrap(), vec![arrival()]);
    }

    #[tokio::test]
    async fn test_listener_loads_eagerly() {
        let h = harness(RetryPolicy::immediate(3));
        h.store.seed(&user("alice"), [inception(), heat()]);
        let mut events = h.sync.events();
        let listener = h.sync.spawn_session_listener();

        h.sessions.sign_in(alice()).await.unwrap();

        let loaded = wait_for_event(&mut events, |e| matches!(e, FavoritesEvent::Loaded { .. })).await;
        assert_eq!(
            loaded,
            FavoritesEvent::Loaded {
                epoch: SessionEpoch::new(1),
                count: 2,
            }
        );

        h.sessions.sign_out().await;
        let reset = wait_for_event(&mut events, |e| {
            matches!(e, FavoritesEvent::Reset { epoch, .. } if *epoch == SessionEpoch::new(2))
        })
        .await;
        assert_eq!(
            reset,
            FavoritesEvent::Reset {
                epoch: SessionEpoch::new(2),
                user_id: None,
            }
        );

        listener.abort();
    }
}

#[cfg(test)]
mod router_tests {
    use platform::retry::RetryPolicy;
    use serde_json::Value;

    use super::support::*;
    use crate::presentation::router::favorites_router;

    async fn serve(h: &Harness) -> String {
        let app = favorites_router(h.sync.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_put_list_delete() {
        let h = harness(RetryPolicy::immediate(3));
        h.sessions.sign_in(alice()).await.unwrap();
        let base = serve(&h).await;
        let client = reqwest::Client::new();

        let response = client
            .put(format!("{base}/27205"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["outcome"], "added");

        let again = client
            .put(format!("{base}/27205"))
            .send()
            .await
            .unwrap();
        assert_eq!(again.status().as_u16(), 200);
        let body: Value = again.json().await.unwrap();
        assert_eq!(body["outcome"], "alreadyPresent");

        let list: Value = client.get(&base).send().await.unwrap().json().await.unwrap();
        assert_eq!(list["epoch"], 1);
        assert_eq!(list["favorites"][0]["title"], "Inception");

        let removed: Value = client
            .delete(format!("{base}/27205"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(removed["outcome"], "removed");
    }

    #[tokio::test]
    async fn test_errors_are_problem_documents() {
        let h = harness(RetryPolicy::immediate(3));
        let base = serve(&h).await;
        let client = reqwest::Client::new();

        let response = client.get(&base).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["kind"], "NOT_AUTHENTICATED");

        h.sessions.sign_in(alice()).await.unwrap();
        let response = client
            .put(format!("{base}/bad%20id"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["kind"], "INVALID_REFERENCE");

        let response = client
            .put(format!("{base}/404404"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }
}
