//! Environment-driven configuration for the hirelane backend.

mod settings;

pub use settings::{AuthConfig, Config, DatabaseConfig, MailConfig, ServerConfig};
