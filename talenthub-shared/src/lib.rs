//! # TalentHub Shared Library
//!
//! This crate contains the types and business logic shared by the TalentHub
//! API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD/query operations
//! - `auth`: Password hashing and session token utilities
//! - `db`: Connection pooling and migration runner
//! - `pagination`: Shared page/limit/offset contract and response envelope
//! - `storage`: Resume blob-storage adapter (S3 plus an in-memory mock)

pub mod auth;
pub mod db;
pub mod models;
pub mod pagination;
pub mod storage;

/// Current version of the TalentHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
