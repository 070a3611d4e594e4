//! Formatters shaping fetched values into write-command arguments.
//!
//! Each formatter is a pure function from one payload shape to the ordered
//! argument sequence its write command expects, with no connection or
//! network concerns. [`write_args`] dispatches exhaustively over
//! [`RawValue`], so every supported type has exactly one formatter.

use std::collections::{BTreeMap, BTreeSet};

use crate::value::{RawValue, WriteArg};

/// Format a fetched value for its type's write command.
pub fn write_args(value: &RawValue) -> Vec<WriteArg> {
    match value {
        RawValue::String(v) => string(v),
        RawValue::List(items) => list(items),
        RawValue::Bitmap(bits) => bitmap(bits),
        RawValue::Set(members) => set(members),
        RawValue::Hash(fields) => hash(fields),
        RawValue::SortedSet(pairs) => sorted_set(pairs),
    }
}

/// A string value is the single argument to `SET`.
pub fn string(value: &[u8]) -> Vec<WriteArg> {
    vec![WriteArg::Blob(value.to_vec())]
}

/// List elements are pushed in the order they were read.
pub fn list(items: &[Vec<u8>]) -> Vec<WriteArg> {
    items.iter().cloned().map(WriteArg::Blob).collect()
}

/// Bit values pass through unchanged, in order.
pub fn bitmap(bits: &[i64]) -> Vec<WriteArg> {
    bits.iter().copied().map(WriteArg::Int).collect()
}

/// Set members in their stable iteration order.
pub fn set(members: &BTreeSet<Vec<u8>>) -> Vec<WriteArg> {
    members.iter().cloned().map(WriteArg::Blob).collect()
}

/// The whole field mapping as one composite argument to `HMSET`.
pub fn hash(fields: &BTreeMap<Vec<u8>, Vec<u8>>) -> Vec<WriteArg> {
    vec![WriteArg::FieldMap(fields.clone())]
}

/// (member, score) pairs flattened as `score member score member ...`,
/// score first as `ZADD` requires, preserving pair order from the read.
pub fn sorted_set(pairs: &[(Vec<u8>, f64)]) -> Vec<WriteArg> {
    let mut args = Vec::with_capacity(pairs.len() * 2);
    for (member, score) in pairs {
        args.push(WriteArg::Float(*score));
        args.push(WriteArg::Blob(member.clone()));
    }
    args
}
