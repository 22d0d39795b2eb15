//! Infrastructure Layer
//!
//! Identity provider and activity log adapters.

pub mod activity;
pub mod memory;

pub use activity::InMemoryActivityLog;
pub use memory::InMemoryIdentityProvider;
