//! # CrickFan Shared Library
//!
//! This crate contains shared types, utilities, and business logic used by
//! the CrickFan API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT sessions, request auth context
//! - `db`: Connection pooling and migrations
//! - `models`: Database models and data structures
//! - `fantasy`: Team composition, scoring, eligibility, schedule and ranking rules
//! - `provider`: Client for the external cricket data API
//! - `sync`: Match cache refresh and point settlement

pub mod auth;
pub mod db;
pub mod fantasy;
pub mod models;
pub mod provider;
pub mod sync;

/// Current version of the CrickFan shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
