pub mod activity;
pub mod session;
