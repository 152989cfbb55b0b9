//! # Harbor Shared Library
//!
//! This crate contains the types and business logic shared by the Harbor API
//! server: database models, authentication primitives, the invitation
//! service, the onboarding router, and the session gate.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication and session-gating utilities
//! - `db`: Connection pool and migrations
//! - `invitations`: The workspace invitation service (verify / accept / reject)
//! - `onboarding`: Pure onboarding routing decision

pub mod auth;
pub mod db;
pub mod invitations;
pub mod models;
pub mod onboarding;

/// Current version of the Harbor shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
