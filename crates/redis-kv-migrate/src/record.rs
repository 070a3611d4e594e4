//! The working set: the immutable key-to-value snapshot bridging the read
//! and write phases.

use std::collections::BTreeMap;

use crate::error::{MigrateError, Result};
use crate::value::RawValue;

/// Everything fetched from the source, keyed by entry key.
///
/// Built once after the read phase and consumed whole by the write phase;
/// nothing mutates it in between. Keys are unique by construction (one
/// record per source key) and each value carries its own type tag, so a
/// record can never pair a key with a mis-typed payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingSet {
    records: BTreeMap<Vec<u8>, RawValue>,
}

impl WorkingSet {
    /// Zip fetched keys and values into the working set by position.
    ///
    /// The fetcher guarantees reply order matches request order, so the
    /// i-th value belongs to the i-th key. A length mismatch means that
    /// guarantee was violated upstream and the run must not continue.
    pub fn assemble(keys: Vec<Vec<u8>>, values: Vec<RawValue>) -> Result<Self> {
        if keys.len() != values.len() {
            return Err(MigrateError::Config(format!(
                "fetched {} values for {} keys; refusing misaligned working set",
                values.len(),
                keys.len()
            )));
        }

        let records = keys.into_iter().zip(values).collect();
        Ok(Self { records })
    }

    /// Number of records in the set.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in stable key order.
    pub fn records(&self) -> impl Iterator<Item = (&Vec<u8>, &RawValue)> {
        self.records.iter()
    }

    /// Look up the value fetched for a key.
    pub fn get(&self, key: &[u8]) -> Option<&RawValue> {
        self.records.get(key)
    }
}
