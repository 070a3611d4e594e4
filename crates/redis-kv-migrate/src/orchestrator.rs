//! Migration orchestrator - main workflow coordinator.
//!
//! One linear pass with no retry: enumerate source keys, fetch types, fetch
//! values, assemble the working set, write it to the destination, aggregate
//! the outcomes. Every read-side failure aborts before a single write is
//! issued; write-side failures leave whatever was already applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::record::WorkingSet;
use crate::source::{RedisSource, SourceStore};
use crate::target::{RedisTarget, TargetStore};
use crate::value::WriteOutcome;

/// Migration orchestrator, generic over the store seams so the workflow can
/// be exercised against fakes.
pub struct Orchestrator<S, T> {
    source: S,
    target: T,
    dry_run: bool,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Unique run identifier.
    pub run_id: String,

    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Whether the write phase was skipped.
    pub dry_run: bool,

    /// Keys found in the source.
    pub keys_total: usize,

    /// Keys whose write outcome was accepted.
    pub keys_written: usize,

    /// Keys whose write outcome was rejected.
    pub keys_failed: usize,

    /// The rejected keys, lossily decoded for display.
    pub failed_keys: Vec<String>,

    /// True iff every write outcome was accepted.
    pub success: bool,
}

impl MigrationResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// True iff every outcome in the batch was accepted.
pub fn all_succeeded(outcomes: &[WriteOutcome]) -> bool {
    outcomes.iter().all(|ok| *ok)
}

impl Orchestrator<RedisSource, RedisTarget> {
    /// Connect to both endpoints and verify each with a ping.
    pub async fn connect(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut source = RedisSource::connect(&config.source).await?;
        source.ping().await?;

        let mut target = RedisTarget::connect(&config.target).await?;
        target.ping().await?;

        Ok(Self::new(source, target))
    }
}

impl<S: SourceStore, T: TargetStore> Orchestrator<S, T> {
    /// Create an orchestrator over already-connected stores.
    pub fn new(source: S, target: T) -> Self {
        Self {
            source,
            target,
            dry_run: false,
        }
    }

    /// Skip the write phase and only report what would be written.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the migration.
    pub async fn run(mut self) -> Result<MigrationResult> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        info!("Starting migration run: {}", run_id);

        info!("Phase 1: Enumerating source keys");
        let keys = self.source.keys().await?;
        info!("Found {} keys to migrate", keys.len());

        info!("Phase 2: Fetching value types");
        let types = self.source.value_types(&keys).await?;

        info!("Phase 3: Fetching values");
        let values = self.source.values(&keys, &types).await?;

        let set = WorkingSet::assemble(keys, values)?;

        let outcomes = if self.dry_run {
            info!("Dry run: skipping write phase for {} keys", set.len());
            vec![true; set.len()]
        } else {
            info!("Phase 4: Writing {} keys to destination", set.len());
            self.target.write_all(&set).await?
        };

        let mut failed_keys = Vec::new();
        for ((key, _), accepted) in set.records().zip(&outcomes) {
            if !accepted {
                failed_keys.push(String::from_utf8_lossy(key).into_owned());
            }
        }

        let success = all_succeeded(&outcomes);
        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let result = MigrationResult {
            run_id,
            started_at,
            completed_at,
            duration_seconds: duration,
            dry_run: self.dry_run,
            keys_total: set.len(),
            keys_written: set.len() - failed_keys.len(),
            keys_failed: failed_keys.len(),
            failed_keys,
            success,
        };

        if result.success {
            info!(
                "Migration completed: {} keys in {:.2}s",
                result.keys_total, result.duration_seconds
            );
        } else {
            warn!(
                "Migration finished with {} of {} keys rejected",
                result.keys_failed, result.keys_total
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrateError;
    use crate::value::{RawValue, ValueType};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// In-memory source yielding a fixed snapshot, or failing a chosen phase.
    struct FakeSource {
        entries: Vec<(Vec<u8>, RawValue)>,
        fail_types: bool,
        fail_values: bool,
    }

    impl FakeSource {
        fn with_entries(entries: Vec<(Vec<u8>, RawValue)>) -> Self {
            Self {
                entries,
                fail_types: false,
                fail_values: false,
            }
        }
    }

    #[async_trait]
    impl SourceStore for FakeSource {
        async fn keys(&mut self) -> crate::error::Result<Vec<Vec<u8>>> {
            Ok(self.entries.iter().map(|(k, _)| k.clone()).collect())
        }

        async fn value_types(
            &mut self,
            keys: &[Vec<u8>],
        ) -> crate::error::Result<Vec<ValueType>> {
            if self.fail_types {
                return Err(MigrateError::unsupported_type(b"stream"));
            }
            assert_eq!(keys.len(), self.entries.len());
            Ok(self.entries.iter().map(|(_, v)| v.value_type()).collect())
        }

        async fn values(
            &mut self,
            keys: &[Vec<u8>],
            types: &[ValueType],
        ) -> crate::error::Result<Vec<RawValue>> {
            if self.fail_values {
                return Err(MigrateError::reply("GET", b"k", "connection reset"));
            }
            assert_eq!(keys.len(), types.len());
            Ok(self.entries.iter().map(|(_, v)| v.clone()).collect())
        }

        async fn ping(&mut self) -> crate::error::Result<()> {
            Ok(())
        }
    }

    /// Sink that records whether it was written to and replies per key.
    struct FakeTarget {
        written: Arc<AtomicBool>,
        outcomes: Vec<WriteOutcome>,
    }

    impl FakeTarget {
        fn accepting(written: Arc<AtomicBool>) -> Self {
            Self {
                written,
                outcomes: Vec::new(),
            }
        }

        fn with_outcomes(outcomes: Vec<WriteOutcome>) -> Self {
            Self {
                written: Arc::new(AtomicBool::new(false)),
                outcomes,
            }
        }
    }

    #[async_trait]
    impl TargetStore for FakeTarget {
        async fn write_all(
            &mut self,
            set: &WorkingSet,
        ) -> crate::error::Result<Vec<WriteOutcome>> {
            self.written.store(true, Ordering::SeqCst);
            if self.outcomes.is_empty() {
                Ok(vec![true; set.len()])
            } else {
                Ok(self.outcomes.clone())
            }
        }

        async fn ping(&mut self) -> crate::error::Result<()> {
            Ok(())
        }
    }

    fn sample_entries() -> Vec<(Vec<u8>, RawValue)> {
        vec![
            (b"k1".to_vec(), RawValue::String(b"v1".to_vec())),
            (b"k2".to_vec(), RawValue::List(vec![b"a".to_vec()])),
            (
                b"k3".to_vec(),
                RawValue::SortedSet(vec![(b"m".to_vec(), 1.0)]),
            ),
        ]
    }

    #[test]
    fn test_all_succeeded_semantics() {
        assert!(all_succeeded(&[true, true, true]));
        assert!(!all_succeeded(&[true, false, true]));
        assert!(!all_succeeded(&[false]));
        assert!(all_succeeded(&[]));
    }

    #[tokio::test]
    async fn test_run_migrates_every_key() {
        let source = FakeSource::with_entries(sample_entries());
        let target = FakeTarget::with_outcomes(Vec::new());

        let result = Orchestrator::new(source, target).run().await.unwrap();

        assert!(result.success);
        assert_eq!(result.keys_total, 3);
        assert_eq!(result.keys_written, 3);
        assert_eq!(result.keys_failed, 0);
        assert!(result.failed_keys.is_empty());
    }

    #[tokio::test]
    async fn test_run_reports_rejected_keys() {
        let source = FakeSource::with_entries(sample_entries());
        // Records iterate in key order: k1, k2, k3.
        let target = FakeTarget::with_outcomes(vec![true, false, true]);

        let result = Orchestrator::new(source, target).run().await.unwrap();

        assert!(!result.success);
        assert_eq!(result.keys_written, 2);
        assert_eq!(result.keys_failed, 1);
        assert_eq!(result.failed_keys, vec!["k2".to_string()]);
    }

    #[tokio::test]
    async fn test_type_fetch_failure_never_touches_target() {
        let mut source = FakeSource::with_entries(sample_entries());
        source.fail_types = true;

        let written = Arc::new(AtomicBool::new(false));
        let target = FakeTarget::accepting(written.clone());

        let err = Orchestrator::new(source, target).run().await.unwrap_err();

        assert!(matches!(err, MigrateError::Config(_)));
        assert!(!written.load(Ordering::SeqCst), "no write may be issued");
    }

    #[tokio::test]
    async fn test_value_fetch_failure_never_touches_target() {
        let mut source = FakeSource::with_entries(sample_entries());
        source.fail_values = true;

        let written = Arc::new(AtomicBool::new(false));
        let target = FakeTarget::accepting(written.clone());

        let err = Orchestrator::new(source, target).run().await.unwrap_err();

        assert!(matches!(err, MigrateError::Reply { .. }));
        assert!(!written.load(Ordering::SeqCst), "no write may be issued");
    }

    #[tokio::test]
    async fn test_dry_run_skips_write_phase() {
        let source = FakeSource::with_entries(sample_entries());
        let written = Arc::new(AtomicBool::new(false));
        let target = FakeTarget::accepting(written.clone());

        let result = Orchestrator::new(source, target)
            .with_dry_run(true)
            .run()
            .await
            .unwrap();

        assert!(result.dry_run);
        assert!(result.success);
        assert_eq!(result.keys_total, 3);
        assert!(!written.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_empty_source_succeeds() {
        let source = FakeSource::with_entries(Vec::new());
        let target = FakeTarget::with_outcomes(Vec::new());

        let result = Orchestrator::new(source, target).run().await.unwrap();

        assert!(result.success);
        assert_eq!(result.keys_total, 0);
        assert_eq!(result.keys_failed, 0);
    }

    #[test]
    fn test_result_serializes_to_json() {
        let result = MigrationResult {
            run_id: "run".into(),
            started_at: Utc::now(),
            completed_at: Utc::now(),
            duration_seconds: 0.5,
            dry_run: false,
            keys_total: 2,
            keys_written: 1,
            keys_failed: 1,
            failed_keys: vec!["k2".into()],
            success: false,
        };

        let json = result.to_json().unwrap();
        assert!(json.contains("\"keys_failed\": 1"));
        assert!(json.contains("k2"));
    }
}
