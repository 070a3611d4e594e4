//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
///
/// The taxonomy distinguishes where a failure happened, not just what it
/// was: any `Source` or `Reply` error is raised before the destination is
/// touched, while a `Target` error may leave the destination partially
/// written. Individual write rejections are not errors at all; they are
/// reported through [`crate::orchestrator::MigrationResult`].
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid endpoint, unsupported value type, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source store connection or round-trip error
    #[error("Source store error: {0}")]
    Source(#[source] redis::RedisError),

    /// Target store connection or round-trip error
    #[error("Target store error: {0}")]
    Target(#[source] redis::RedisError),

    /// A reply from the source did not have the shape its value type implies
    #[error("Malformed {command} reply for key '{key}': {message}")]
    Reply {
        command: &'static str,
        key: String,
        message: String,
    },

    /// JSON serialization error (result reporting)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Config error for a value type outside the supported set.
    pub fn unsupported_type(wire_name: &[u8]) -> Self {
        MigrateError::Config(format!(
            "unsupported value type '{}': expected one of string, list, bitmap, set, hash, zset",
            String::from_utf8_lossy(wire_name)
        ))
    }

    /// Create a Reply error for a key whose value could not be decoded.
    pub fn reply(command: &'static str, key: &[u8], message: impl Into<String>) -> Self {
        MigrateError::Reply {
            command,
            key: String::from_utf8_lossy(key).into_owned(),
            message: message.into(),
        }
    }

    /// Process exit code for this error class.
    ///
    /// 1 = configuration, 2 = source side (read phase, destination
    /// untouched), 3 = target side (destination possibly partial).
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Json(_) => 1,
            MigrateError::Source(_) | MigrateError::Reply { .. } => 2,
            MigrateError::Target(_) => 3,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
