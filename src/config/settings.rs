//! # Configuration Settings
//!
//! Environment-driven configuration for the hirelane backend.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::errors::{Error, Result};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct Config {
    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Authentication configuration
    #[validate(nested)]
    pub auth: AuthConfig,

    /// Outbound mail configuration
    #[validate(nested)]
    pub mail: MailConfig,
}

impl Config {
    /// Load the full configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env()?,
            mail: MailConfig::from_env(),
        };
        config.validate_all()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate_all(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;

        // Validate database URL format
        if !self.database.url.starts_with("sqlite:") {
            return Err(Error::validation("Database URL must start with 'sqlite:'"));
        }

        // Validate signing secret lengths
        if self.auth.session_secret.len() < 32 {
            return Err(Error::validation("Session secret must be at least 32 characters long"));
        }
        if self.auth.confirmation_secret.len() < 32 {
            return Err(Error::validation(
                "Confirmation secret must be at least 32 characters long",
            ));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Enable CORS
    pub enable_cors: bool,

    /// CORS allowed origins (empty = allow all)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080, enable_cors: true, cors_origins: vec![] }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HIRELANE_API_HOST").unwrap_or(defaults.host),
            port: std::env::var("HIRELANE_API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            enable_cors: std::env::var("HIRELANE_ENABLE_CORS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.enable_cors),
            cors_origins: std::env::var("HIRELANE_CORS_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum pool connections
    pub max_connections: u32,

    /// Minimum pool connections
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout_seconds: u64,

    /// Idle connection timeout in seconds (None = keep idle connections)
    pub idle_timeout_seconds: Option<u64>,

    /// Run pending migrations on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/hirelane.db".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("HIRELANE_DATABASE_URL").unwrap_or(defaults.url),
            max_connections: std::env::var("HIRELANE_DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connections),
            min_connections: std::env::var("HIRELANE_DATABASE_MIN_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_connections),
            connect_timeout_seconds: std::env::var("HIRELANE_DATABASE_CONNECT_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.connect_timeout_seconds),
            idle_timeout_seconds: std::env::var("HIRELANE_DATABASE_IDLE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(defaults.idle_timeout_seconds),
            auto_migrate: std::env::var("HIRELANE_DATABASE_AUTO_MIGRATE")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.auto_migrate),
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_seconds.map(Duration::from_secs)
    }
}

/// Authentication configuration: signing secrets for the two token classes.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AuthConfig {
    pub session_secret: String,
    pub confirmation_secret: String,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        let session_secret = std::env::var("HIRELANE_SESSION_SECRET")
            .map_err(|_| Error::config("HIRELANE_SESSION_SECRET is not set"))?;
        let confirmation_secret = std::env::var("HIRELANE_CONFIRM_SECRET")
            .map_err(|_| Error::config("HIRELANE_CONFIRM_SECRET is not set"))?;
        Ok(Self { session_secret, confirmation_secret })
    }
}

/// Outbound mail configuration for the SMTP transport.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender shown on outbound messages
    pub from_address: String,
    /// Base URL used when building confirmation links
    pub public_base_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            username: None,
            password: None,
            from_address: "Hirelane <no-reply@hirelane.example>".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl MailConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            smtp_host: std::env::var("HIRELANE_SMTP_HOST").unwrap_or(defaults.smtp_host),
            smtp_port: std::env::var("HIRELANE_SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.smtp_port),
            username: std::env::var("HIRELANE_SMTP_USERNAME").ok(),
            password: std::env::var("HIRELANE_SMTP_PASSWORD").ok(),
            from_address: std::env::var("HIRELANE_MAIL_FROM").unwrap_or(defaults.from_address),
            public_base_url: std::env::var("HIRELANE_PUBLIC_BASE_URL")
                .unwrap_or(defaults.public_base_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn default_database_config_is_sqlite() {
        let config = DatabaseConfig::default();
        assert!(config.is_sqlite());
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn short_secrets_are_rejected() {
        let config = Config {
            auth: AuthConfig {
                session_secret: "short".to_string(),
                confirmation_secret: "x".repeat(32),
            },
            ..Default::default()
        };

        assert!(config.validate_all().is_err());
    }

    #[test]
    fn well_formed_config_passes_validation() {
        let config = Config {
            auth: AuthConfig {
                session_secret: "s".repeat(32),
                confirmation_secret: "c".repeat(32),
            },
            mail: MailConfig::default(),
            ..Default::default()
        };

        assert!(config.validate_all().is_ok());
    }
}
