//! # redis-kv-migrate
//!
//! Bulk key/value migration between Redis-protocol stores.
//!
//! This library copies every key from one store instance to another with
//! type-appropriate read and write commands for the six supported value
//! shapes (string, list, bitmap, set, hash, sorted set):
//!
//! - **Batched round trips** - keys, types, values, and writes each go over
//!   the wire as one pipelined request
//! - **Read-before-write guarantee** - any read-side failure aborts before
//!   the destination is touched
//! - **Per-key outcome reporting** - rejected keys are listed in the result
//!   rather than collapsed into a single flag
//! - **Dry-run mode** - fetch and report without writing
//!
//! The transfer is a single best-effort pass: no resume, no retry, no live
//! synchronization.
//!
//! ## Example
//!
//! ```rust,no_run
//! use redis_kv_migrate::{Config, EndpointConfig, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> redis_kv_migrate::Result<()> {
//!     let config = Config {
//!         source: EndpointConfig::new("old-cache.internal"),
//!         target: EndpointConfig::new("new-cache.internal"),
//!     };
//!     let result = Orchestrator::connect(&config).await?.run().await?;
//!     println!("Migrated {} keys", result.keys_written);
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod orchestrator;
pub mod record;
pub mod source;
pub mod target;
pub mod value;

// Re-exports for convenient access
pub use config::{Config, EndpointConfig};
pub use error::{MigrateError, Result};
pub use orchestrator::{all_succeeded, MigrationResult, Orchestrator};
pub use record::WorkingSet;
pub use source::{RedisSource, SourceStore};
pub use target::{RedisTarget, TargetStore};
pub use value::{RawValue, ValueType, WriteArg, WriteOutcome};
