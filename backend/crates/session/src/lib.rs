//! Session Module
//!
//! Clean Architecture structure:
//! - `domain/` - Session entity, epochs, credentials, the identity provider
//!   and activity log seams
//! - `application/` - Session manager state machine, configuration
//! - `infra/` - In-memory identity provider and activity log
//! - `presentation/` - HTTP handlers, DTOs, router, SSE stream
//!
//! ## Features
//! - One sign-in/sign-out transition at a time
//! - Epoch bump on every sign-in and sign-out, published on a watch channel
//! - Sign-out is always local first; remote revoke failures are only logged
//! - Secrets zeroized on drop and redacted from `Debug`
//! - Login/logout activity log per user

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::SessionConfig;
pub use application::manager::SessionManager;
pub use domain::entity::session::{
    SessionChange, SessionEpoch, SessionSnapshot, SessionStatus, SignOutReason, UserSession,
};
pub use domain::activity::ActivityLog;
pub use domain::entity::activity::ActivityEntry;
pub use domain::provider::IdentityProvider;
pub use domain::value_object::{
    access_token::AccessToken,
    credential::{AuthenticatedUser, Credential},
};
pub use error::{SessionError, SessionResult};
pub use infra::activity::InMemoryActivityLog;
pub use infra::memory::InMemoryIdentityProvider;
pub use presentation::router::session_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
pub use kernel::id::UserId;
