//! Writing the working set to the destination store.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{Pipeline, Value};
use tracing::debug;

use crate::commands;
use crate::config::EndpointConfig;
use crate::error::{MigrateError, Result};
use crate::format;
use crate::record::WorkingSet;
use crate::value::{WriteArg, WriteOutcome};

/// Write-side capability surface of a store.
#[async_trait]
pub trait TargetStore: Send {
    /// Issue the type-appropriate write command for every record as one
    /// batched round trip. Outcomes are returned in record iteration order.
    ///
    /// Writes that the round trip delivers stay committed even when later
    /// sub-commands are rejected; there is no rollback.
    async fn write_all(&mut self, set: &WorkingSet) -> Result<Vec<WriteOutcome>>;

    /// Verify the connection is alive.
    async fn ping(&mut self) -> Result<()>;
}

/// Target store over a Redis-protocol connection.
pub struct RedisTarget {
    conn: MultiplexedConnection,
}

impl RedisTarget {
    /// Connect to the destination endpoint.
    pub async fn connect(config: &EndpointConfig) -> Result<Self> {
        let client = redis::Client::open(config.url()).map_err(MigrateError::Target)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(MigrateError::Target)?;
        debug!("Connected to target {}:{}", config.host, config.port);
        Ok(Self { conn })
    }
}

#[async_trait]
impl TargetStore for RedisTarget {
    async fn write_all(&mut self, set: &WorkingSet) -> Result<Vec<WriteOutcome>> {
        if set.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for (key, value) in set.records() {
            pipe.cmd(commands::write_command(value.value_type())).arg(key);
            for arg in format::write_args(value) {
                push_arg(&mut pipe, arg);
            }
        }

        let replies: Vec<Value> = pipe
            .query_async(&mut self.conn)
            .await
            .map_err(MigrateError::Target)?;

        Ok(replies.iter().map(reply_is_ok).collect())
    }

    async fn ping(&mut self) -> Result<()> {
        redis::cmd("PING")
            .query_async::<_, String>(&mut self.conn)
            .await
            .map_err(MigrateError::Target)?;
        Ok(())
    }
}

/// Append one formatted argument to the pipeline's current command.
///
/// This is where the composite field mapping expands into `field value`
/// pairs on the wire.
fn push_arg(pipe: &mut Pipeline, arg: WriteArg) {
    match arg {
        WriteArg::Blob(bytes) => {
            pipe.arg(bytes);
        }
        WriteArg::Int(n) => {
            pipe.arg(n);
        }
        WriteArg::Float(f) => {
            pipe.arg(f);
        }
        WriteArg::FieldMap(fields) => {
            for (field, value) in fields {
                pipe.arg(field).arg(value);
            }
        }
    }
}

/// Truthiness of one write reply: `OK`/status replies and nonzero integers
/// count as success, nil and zero as failure.
pub(crate) fn reply_is_ok(reply: &Value) -> bool {
    match reply {
        Value::Okay | Value::Status(_) => true,
        Value::Int(n) => *n != 0,
        Value::Nil => false,
        Value::Data(_) | Value::Bulk(_) => true,
    }
}
