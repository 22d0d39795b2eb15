//! Application Layer
//!
//! Session manager and configuration.

pub mod config;
pub mod manager;

// Re-exports
pub use config::SessionConfig;
pub use manager::SessionManager;
