//! Value types and in-memory representations for migrated entries.
//!
//! A store reports one of six value shapes for every key. [`ValueType`] is
//! the closed enumeration of those shapes and [`RawValue`] is the tagged
//! union carrying the payload read for a key. Because the payload variant
//! itself encodes the type, a record whose type and value disagree is
//! unrepresentable.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{MigrateError, Result};

/// Shape tag reported by the store for a key, as returned by `TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Single byte string (`string`).
    String,
    /// Ordered sequence of byte strings (`list`).
    List,
    /// Ordered bit sequence (`bitmap`).
    Bitmap,
    /// Unordered collection of unique byte strings (`set`).
    Set,
    /// Field-to-value mapping (`hash`).
    Hash,
    /// Score-ordered members (`zset`).
    SortedSet,
}

impl ValueType {
    /// Every supported value type, in wire-name order.
    pub const ALL: [ValueType; 6] = [
        ValueType::String,
        ValueType::List,
        ValueType::Bitmap,
        ValueType::Set,
        ValueType::Hash,
        ValueType::SortedSet,
    ];

    /// Parse a `TYPE` reply into a value type.
    ///
    /// Any name outside the supported set is a configuration error: the
    /// command tables are exhaustive over this enumeration, so a type we
    /// cannot name is a type we cannot migrate.
    pub fn from_wire(name: &[u8]) -> Result<Self> {
        match name {
            b"string" => Ok(ValueType::String),
            b"list" => Ok(ValueType::List),
            b"bitmap" => Ok(ValueType::Bitmap),
            b"set" => Ok(ValueType::Set),
            b"hash" => Ok(ValueType::Hash),
            b"zset" => Ok(ValueType::SortedSet),
            other => Err(MigrateError::unsupported_type(other)),
        }
    }

    /// The wire name the store uses for this type.
    pub fn wire_name(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::List => "list",
            ValueType::Bitmap => "bitmap",
            ValueType::Set => "set",
            ValueType::Hash => "hash",
            ValueType::SortedSet => "zset",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// In-memory representation of a fetched value, shaped by its type.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Single byte string.
    String(Vec<u8>),
    /// Elements in list order (head first).
    List(Vec<Vec<u8>>),
    /// Bit values in offset order, passed through to the write verbatim.
    Bitmap(Vec<i64>),
    /// Members in a stable (lexicographic) iteration order.
    Set(BTreeSet<Vec<u8>>),
    /// Field-to-value mapping.
    Hash(BTreeMap<Vec<u8>, Vec<u8>>),
    /// (member, score) pairs in the order the read returned them.
    SortedSet(Vec<(Vec<u8>, f64)>),
}

impl RawValue {
    /// The value type this payload was read as.
    pub fn value_type(&self) -> ValueType {
        match self {
            RawValue::String(_) => ValueType::String,
            RawValue::List(_) => ValueType::List,
            RawValue::Bitmap(_) => ValueType::Bitmap,
            RawValue::Set(_) => ValueType::Set,
            RawValue::Hash(_) => ValueType::Hash,
            RawValue::SortedSet(_) => ValueType::SortedSet,
        }
    }
}

/// One positional argument of a write command, after the key.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteArg {
    /// Byte string argument.
    Blob(Vec<u8>),
    /// Integer argument.
    Int(i64),
    /// Floating-point argument (sorted-set scores).
    Float(f64),
    /// A whole field mapping as a single composite argument. Expanded into
    /// `field value` pairs only when the command is put on the wire.
    FieldMap(BTreeMap<Vec<u8>, Vec<u8>>),
}

/// Per-key truthiness of a write reply, positionally aligned with the batch.
pub type WriteOutcome = bool;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_roundtrips_all_supported_types() {
        for ty in ValueType::ALL {
            assert_eq!(ValueType::from_wire(ty.wire_name().as_bytes()).unwrap(), ty);
        }
    }

    #[test]
    fn test_from_wire_rejects_unknown_type() {
        let err = ValueType::from_wire(b"stream").unwrap_err();
        assert!(matches!(err, MigrateError::Config(_)));
    }

    #[test]
    fn test_from_wire_rejects_empty_name() {
        assert!(ValueType::from_wire(b"").is_err());
    }

    #[test]
    fn test_raw_value_reports_its_type() {
        assert_eq!(
            RawValue::String(b"v".to_vec()).value_type(),
            ValueType::String
        );
        assert_eq!(RawValue::List(vec![]).value_type(), ValueType::List);
        assert_eq!(RawValue::Bitmap(vec![1]).value_type(), ValueType::Bitmap);
        assert_eq!(RawValue::Set(BTreeSet::new()).value_type(), ValueType::Set);
        assert_eq!(RawValue::Hash(BTreeMap::new()).value_type(), ValueType::Hash);
        assert_eq!(
            RawValue::SortedSet(vec![]).value_type(),
            ValueType::SortedSet
        );
    }
}
