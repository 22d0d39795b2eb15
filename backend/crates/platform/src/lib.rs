//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Environment configuration helpers
//! - Hashing utilities (SHA-256 fingerprints for secrets in logs)
//! - HTTP client construction and API key rotation
//! - Bounded exponential backoff for transient failures

pub mod config;
pub mod crypto;
pub mod http;
pub mod retry;
