//! Reading keys, types, and values from the source store.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::commands::{self, FixedArg};
use crate::config::EndpointConfig;
use crate::error::{MigrateError, Result};
use crate::value::{RawValue, ValueType};

/// Read-side capability surface of a store.
///
/// All three operations batch their sub-commands into a single round trip
/// and return results in input order. Any error here is raised before the
/// destination is touched.
#[async_trait]
pub trait SourceStore: Send {
    /// Every key currently in the store. No ordering or snapshot guarantee:
    /// keys mutated concurrently may be missed or double-counted.
    async fn keys(&mut self) -> Result<Vec<Vec<u8>>>;

    /// The declared type of each key, in input order.
    async fn value_types(&mut self, keys: &[Vec<u8>]) -> Result<Vec<ValueType>>;

    /// The value of each key using its type-appropriate read command, in
    /// input order. `keys` and `types` must be positionally aligned.
    async fn values(&mut self, keys: &[Vec<u8>], types: &[ValueType]) -> Result<Vec<RawValue>>;

    /// Verify the connection is alive.
    async fn ping(&mut self) -> Result<()>;
}

/// Source store over a Redis-protocol connection.
pub struct RedisSource {
    conn: MultiplexedConnection,
}

impl RedisSource {
    /// Connect to the source endpoint.
    pub async fn connect(config: &EndpointConfig) -> Result<Self> {
        let client = redis::Client::open(config.url()).map_err(MigrateError::Source)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(MigrateError::Source)?;
        debug!("Connected to source {}:{}", config.host, config.port);
        Ok(Self { conn })
    }
}

#[async_trait]
impl SourceStore for RedisSource {
    async fn keys(&mut self) -> Result<Vec<Vec<u8>>> {
        redis::cmd("KEYS")
            .arg("*")
            .query_async(&mut self.conn)
            .await
            .map_err(MigrateError::Source)
    }

    async fn value_types(&mut self, keys: &[Vec<u8>]) -> Result<Vec<ValueType>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for key in keys {
            pipe.cmd("TYPE").arg(key);
        }

        let replies: Vec<Value> = pipe
            .query_async(&mut self.conn)
            .await
            .map_err(MigrateError::Source)?;
        check_reply_count("TYPE", keys.len(), replies.len())?;

        keys.iter()
            .zip(replies)
            .map(|(key, reply)| parse_type_reply(key, reply))
            .collect()
    }

    async fn values(&mut self, keys: &[Vec<u8>], types: &[ValueType]) -> Result<Vec<RawValue>> {
        if keys.len() != types.len() {
            return Err(MigrateError::Config(format!(
                "fetched {} types for {} keys; refusing misaligned value fetch",
                types.len(),
                keys.len()
            )));
        }
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for (key, ty) in keys.iter().zip(types) {
            let read = commands::read_command(*ty);
            pipe.cmd(read.name).arg(key);
            for fixed in read.fixed_args {
                match fixed {
                    FixedArg::Int(n) => pipe.arg(*n),
                    FixedArg::Keyword(word) => pipe.arg(*word),
                };
            }
        }

        let replies: Vec<Value> = pipe
            .query_async(&mut self.conn)
            .await
            .map_err(MigrateError::Source)?;
        check_reply_count("read", keys.len(), replies.len())?;

        keys.iter()
            .zip(types)
            .zip(replies)
            .map(|((key, ty), reply)| parse_value(*ty, key, reply))
            .collect()
    }

    async fn ping(&mut self) -> Result<()> {
        redis::cmd("PING")
            .query_async::<_, String>(&mut self.conn)
            .await
            .map_err(MigrateError::Source)?;
        Ok(())
    }
}

fn check_reply_count(what: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(MigrateError::reply(
            what,
            b"*",
            format!("pipeline returned {} replies for {} commands", got, expected),
        ))
    }
}

/// Decode a `TYPE` reply into a value type.
fn parse_type_reply(key: &[u8], reply: Value) -> Result<ValueType> {
    match reply {
        Value::Status(name) => ValueType::from_wire(name.as_bytes()),
        Value::Data(name) => ValueType::from_wire(&name),
        other => Err(MigrateError::reply(
            "TYPE",
            key,
            format!("expected a type name, got {:?}", other),
        )),
    }
}

/// Decode a read reply into the in-memory shape its type implies.
fn parse_value(ty: ValueType, key: &[u8], reply: Value) -> Result<RawValue> {
    match ty {
        ValueType::String => parse_string(key, reply),
        ValueType::List => Ok(RawValue::List(parse_blob_seq("LRANGE", key, reply)?)),
        ValueType::Bitmap => parse_bitmap(key, reply),
        ValueType::Set => {
            let members = parse_blob_seq("SMEMBERS", key, reply)?;
            Ok(RawValue::Set(members.into_iter().collect()))
        }
        ValueType::Hash => parse_hash(key, reply),
        ValueType::SortedSet => parse_sorted_set(key, reply),
    }
}

fn parse_string(key: &[u8], reply: Value) -> Result<RawValue> {
    match reply {
        Value::Data(bytes) => Ok(RawValue::String(bytes)),
        // The key vanished between enumeration and read. Concurrent
        // mutation is an accepted limitation; surface it rather than
        // writing an empty value the source never held.
        Value::Nil => Err(MigrateError::reply(
            "GET",
            key,
            "key disappeared during migration",
        )),
        other => Err(MigrateError::reply(
            "GET",
            key,
            format!("expected a byte string, got {:?}", other),
        )),
    }
}

fn parse_bitmap(key: &[u8], reply: Value) -> Result<RawValue> {
    match reply {
        Value::Int(bit) => Ok(RawValue::Bitmap(vec![bit])),
        other => Err(MigrateError::reply(
            "GETBIT",
            key,
            format!("expected a bit value, got {:?}", other),
        )),
    }
}

fn parse_blob_seq(command: &'static str, key: &[u8], reply: Value) -> Result<Vec<Vec<u8>>> {
    let items = match reply {
        Value::Bulk(items) => items,
        other => {
            return Err(MigrateError::reply(
                command,
                key,
                format!("expected an array, got {:?}", other),
            ))
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Data(bytes) => Ok(bytes),
            other => Err(MigrateError::reply(
                command,
                key,
                format!("expected a byte string element, got {:?}", other),
            )),
        })
        .collect()
}

fn parse_hash(key: &[u8], reply: Value) -> Result<RawValue> {
    let flat = parse_blob_seq("HGETALL", key, reply)?;
    if flat.len() % 2 != 0 {
        return Err(MigrateError::reply(
            "HGETALL",
            key,
            format!("odd number of entries ({})", flat.len()),
        ));
    }

    let mut fields = BTreeMap::new();
    let mut entries = flat.into_iter();
    while let (Some(field), Some(value)) = (entries.next(), entries.next()) {
        fields.insert(field, value);
    }
    Ok(RawValue::Hash(fields))
}

fn parse_sorted_set(key: &[u8], reply: Value) -> Result<RawValue> {
    let flat = parse_blob_seq("ZRANGE", key, reply)?;
    if flat.len() % 2 != 0 {
        return Err(MigrateError::reply(
            "ZRANGE",
            key,
            format!("odd number of entries ({})", flat.len()),
        ));
    }

    let mut pairs = Vec::with_capacity(flat.len() / 2);
    let mut entries = flat.into_iter();
    while let (Some(member), Some(score_bytes)) = (entries.next(), entries.next()) {
        let score = std::str::from_utf8(&score_bytes)
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| {
                MigrateError::reply(
                    "ZRANGE",
                    key,
                    format!("unparseable score '{}'", String::from_utf8_lossy(&score_bytes)),
                )
            })?;
        pairs.push((member, score));
    }
    Ok(RawValue::SortedSet(pairs))
}
