//! Session Router

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::application::manager::SessionManager;
use crate::domain::activity::ActivityLog;
use crate::domain::provider::IdentityProvider;
use crate::presentation::handlers::{self, SessionAppState};

/// Create the session router for any identity provider and activity log
pub fn session_router<P, A>(manager: Arc<SessionManager<P, A>>) -> Router
where
    P: IdentityProvider + Send + Sync + 'static,
    A: ActivityLog + Send + Sync + 'static,
{
    let state = SessionAppState { manager };

    Router::new()
        .route("/", get(handlers::session_status::<P, A>))
        .route("/sign-in", post(handlers::sign_in::<P, A>))
        .route("/sign-out", post(handlers::sign_out::<P, A>))
        .route("/activity", get(handlers::activity::<P, A>))
        .route("/events", get(handlers::session_events::<P, A>))
        .with_state(state)
}
