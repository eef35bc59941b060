//! # Storage Layer
//!
//! SQLite-backed persistence: connection pooling, schema migrations, and the
//! entity repositories.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, DbPool};
