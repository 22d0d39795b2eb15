//! Domain Layer
//!
//! Contains the session and activity entities, credential value objects,
//! the identity provider trait and the activity log trait.

pub mod activity;
pub mod entity;
pub mod provider;
pub mod value_object;

// Re-exports
pub use entity::session::{SessionChange, SessionEpoch, SessionSnapshot, SessionStatus, UserSession};
pub use activity::ActivityLog;
pub use entity::activity::ActivityEntry;
pub use provider::IdentityProvider;
