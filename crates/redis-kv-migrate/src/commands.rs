//! Command tables mapping value types to read and write commands.
//!
//! Both tables are process-wide constants realized as exhaustive matches
//! over [`ValueType`], so there is no runtime name lookup and no way to
//! reach an unmapped type: anything the store reports outside the
//! enumeration is already rejected by [`ValueType::from_wire`].

use crate::value::ValueType;

/// First index of the read window for ordered containers.
pub const RANGE_START: i64 = 0;

/// Last index of the read window for ordered containers.
///
/// Lists and sorted sets are read as `0..99999` rather than unbounded,
/// capping memory and request size. Entries past this index are silently
/// truncated; this is an inherited scope limit, not tunable.
pub const RANGE_END: i64 = 99_999;

/// A fixed positional argument issued after the key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixedArg {
    /// Numeric argument (range bounds).
    Int(i64),
    /// Literal keyword argument (`WITHSCORES`).
    Keyword(&'static str),
}

/// A read command with its fixed arguments beyond the key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadCommand {
    pub name: &'static str,
    pub fixed_args: &'static [FixedArg],
}

/// Look up the read command for a value type.
pub fn read_command(ty: ValueType) -> ReadCommand {
    match ty {
        ValueType::String => ReadCommand {
            name: "GET",
            fixed_args: &[],
        },
        ValueType::List => ReadCommand {
            name: "LRANGE",
            fixed_args: &[FixedArg::Int(RANGE_START), FixedArg::Int(RANGE_END)],
        },
        // GETBIT is issued without an offset argument, as the original tool
        // did. The store rejects the malformed command, which fails the
        // read round trip and aborts the run before any write. In practice
        // this entry is dormant: TYPE never reports "bitmap".
        ValueType::Bitmap => ReadCommand {
            name: "GETBIT",
            fixed_args: &[],
        },
        ValueType::Set => ReadCommand {
            name: "SMEMBERS",
            fixed_args: &[],
        },
        ValueType::Hash => ReadCommand {
            name: "HGETALL",
            fixed_args: &[],
        },
        ValueType::SortedSet => ReadCommand {
            name: "ZRANGE",
            fixed_args: &[
                FixedArg::Int(RANGE_START),
                FixedArg::Int(RANGE_END),
                FixedArg::Keyword("WITHSCORES"),
            ],
        },
    }
}

/// Look up the write command for a value type.
///
/// The formatter paired with each command lives in [`crate::format`] and is
/// selected by the same exhaustive dispatch over the value payload.
///
/// Lists are written with `RPUSH` so elements land in the order `LRANGE`
/// enumerated them.
pub fn write_command(ty: ValueType) -> &'static str {
    match ty {
        ValueType::String => "SET",
        ValueType::List => "RPUSH",
        ValueType::Bitmap => "SETBIT",
        ValueType::Set => "SADD",
        ValueType::Hash => "HMSET",
        ValueType::SortedSet => "ZADD",
    }
}
