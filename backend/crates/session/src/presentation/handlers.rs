//! HTTP Handlers

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::application::manager::SessionManager;
use crate::domain::activity::ActivityLog;
use crate::domain::provider::IdentityProvider;
use crate::domain::value_object::credential::Credential;
use crate::error::SessionResult;
use crate::presentation::dto::{ActivityResponse, SessionStatusResponse, SessionView, SignInRequest};

/// Shared state for session handlers
pub struct SessionAppState<P, A>
where
    P: IdentityProvider + Send + Sync + 'static,
    A: ActivityLog + Send + Sync + 'static,
{
    pub manager: Arc<SessionManager<P, A>>,
}

impl<P, A> Clone for SessionAppState<P, A>
where
    P: IdentityProvider + Send + Sync + 'static,
    A: ActivityLog + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
        }
    }
}

fn status_response<P, A>(manager: &SessionManager<P, A>) -> SessionStatusResponse
where
    P: IdentityProvider,
    A: ActivityLog,
{
    let session = manager.current_session();
    SessionStatusResponse {
        status: manager.status(),
        epoch: manager.epoch(),
        session: session.as_ref().map(SessionView::from),
    }
}

// ============================================================================
// Sign In / Sign Out
// ============================================================================

/// POST /api/session/sign-in
pub async fn sign_in<P, A>(
    State(state): State<SessionAppState<P, A>>,
    Json(req): Json<SignInRequest>,
) -> SessionResult<Json<SessionView>>
where
    P: IdentityProvider + Send + Sync + 'static,
    A: ActivityLog + Send + Sync + 'static,
{
    let credential = Credential::new(req.provider, req.token);
    let session = state.manager.sign_in(credential).await?;

    Ok(Json(SessionView::from(&session)))
}

/// POST /api/session/sign-out
pub async fn sign_out<P, A>(
    State(state): State<SessionAppState<P, A>>,
) -> Json<SessionStatusResponse>
where
    P: IdentityProvider + Send + Sync + 'static,
    A: ActivityLog + Send + Sync + 'static,
{
    state.manager.sign_out().await;
    Json(status_response(&state.manager))
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/session
pub async fn session_status<P, A>(
    State(state): State<SessionAppState<P, A>>,
) -> Json<SessionStatusResponse>
where
    P: IdentityProvider + Send + Sync + 'static,
    A: ActivityLog + Send + Sync + 'static,
{
    Json(status_response(&state.manager))
}

/// GET /api/session/activity
pub async fn activity<P, A>(
    State(state): State<SessionAppState<P, A>>,
) -> SessionResult<Json<ActivityResponse>>
where
    P: IdentityProvider + Send + Sync + 'static,
    A: ActivityLog + Send + Sync + 'static,
{
    let session = state.manager.require_session()?;
    let entries = state.manager.activity().history(&session.user_id).await?;

    Ok(Json(ActivityResponse { entries }))
}

/// GET /api/session/events (SSE)
pub async fn session_events<P, A>(
    State(state): State<SessionAppState<P, A>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    P: IdentityProvider + Send + Sync + 'static,
    A: ActivityLog + Send + Sync + 'static,
{
    let stream = BroadcastStream::new(state.manager.events()).filter_map(|change| match change {
        Ok(change) => match Event::default().event(change.name()).json_data(&change) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode session event");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "Session event subscriber lagged");
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
