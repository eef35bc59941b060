//! # Hirelane
//!
//! Hirelane is a job-board backend: user accounts with email confirmation,
//! companies owned by HR users, job postings, and applications, behind a
//! role-gated REST API.
//!
//! ## Architecture
//!
//! The system follows a layered architecture pattern:
//!
//! ```text
//! REST API Layer → Services → Repositories → SQLite
//!      ↓               ↓
//! Auth middleware   Notification dispatch (SMTP)
//! ```
//!
//! ## Core Components
//!
//! - **REST API Gateway**: Axum-based HTTP server with per-route role sets
//! - **Auth**: Argon2 password hashing, JWT session/confirmation tokens,
//!   bearer-token middleware
//! - **Cascade plans**: transactional delete sequences keeping
//!   Company → Job → Application referentially consistent
//! - **Persistence Layer**: SQLx with SQLite for entity storage
//!
//! ## Concurrency
//!
//! Requests are handled independently over a shared connection pool; there
//! is no in-process shared mutable state. Cascade plans run inside single
//! transactions, but read-then-write sequences (ownership check → update,
//! uniqueness pre-check → insert) are not serialized across concurrent
//! requests — the UNIQUE indexes backstop the uniqueness checks, and the
//! remaining races are an accepted limitation.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod notifications;
pub mod observability;
pub mod services;
pub mod storage;

// Re-export commonly used types and traits
pub use config::Config;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "hirelane");
    }
}
