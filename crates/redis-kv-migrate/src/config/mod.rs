//! Endpoint configuration and validation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MigrateError, Result};

/// Root configuration: one source endpoint, one target endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store to read from.
    pub source: EndpointConfig,

    /// Store to write to.
    pub target: EndpointConfig,
}

impl Config {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.source.validate("source")?;
        self.target.validate("target")?;

        // Same host, port, and database would migrate a store onto itself.
        if self.source.host == self.target.host
            && self.source.port == self.target.port
            && self.source.database == self.target.database
        {
            return Err(MigrateError::Config(
                "source and target cannot be the same database".into(),
            ));
        }

        Ok(())
    }
}

/// Connection parameters for one store endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Store host.
    pub host: String,

    /// Store port (default: 6379).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Optional password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Logical database index (default: 0).
    #[serde(default)]
    pub database: i64,
}

fn default_port() -> u16 {
    6379
}

impl EndpointConfig {
    /// Endpoint with default port and database.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            password: None,
            database: 0,
        }
    }

    /// Build a connection URL for the redis client.
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.host, self.port, self.database
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.database),
        }
    }

    fn validate(&self, role: &str) -> Result<()> {
        if self.host.is_empty() {
            return Err(MigrateError::Config(format!("{}.host is required", role)));
        }
        if self.database < 0 {
            return Err(MigrateError::Config(format!(
                "{}.database must be non-negative, got {}",
                role, self.database
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "password",
                &self.password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("database", &self.database)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            source: EndpointConfig::new("source.example"),
            target: EndpointConfig::new("target.example"),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let endpoint = EndpointConfig::new("localhost");
        assert_eq!(endpoint.port, 6379);
        assert_eq!(endpoint.database, 0);
        assert!(endpoint.password.is_none());
    }

    #[test]
    fn test_url_without_password() {
        let endpoint = EndpointConfig::new("localhost");
        assert_eq!(endpoint.url(), "redis://localhost:6379/0");
    }

    #[test]
    fn test_url_with_password_and_database() {
        let endpoint = EndpointConfig {
            host: "cache.example".into(),
            port: 6380,
            password: Some("s3cret".into()),
            database: 2,
        };
        assert_eq!(endpoint.url(), "redis://:s3cret@cache.example:6380/2");
    }

    #[test]
    fn test_missing_host_is_rejected() {
        let mut config = valid_config();
        config.source.host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_same_endpoint_is_rejected() {
        let mut config = valid_config();
        config.target = config.source.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_same_host_different_database_is_allowed() {
        let mut config = valid_config();
        config.target = config.source.clone();
        config.target.database = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_password() {
        let endpoint = EndpointConfig {
            host: "localhost".into(),
            port: 6379,
            password: Some("super_secret_password_123".into()),
            database: 0,
        };
        let debug_output = format!("{:?}", endpoint);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_password_123"));
    }
}
