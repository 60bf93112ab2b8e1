//! Key/value backend behind the federation cache.
//!
//! The cache logic is written against the semantic operations it needs so
//! tests can run against an in-memory store with a controllable clock. The
//! production backend is Redis with a cached multiplexed connection and a
//! bounded deadline on every call.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::error::{Error, Result};

/// Semantic store operations used by the federation cache
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// SET with expiry
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// SET NX PX; `true` when the key was created
    async fn set_nx_px(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    async fn del(&self, key: &str) -> Result<()>;

    /// Extend the TTL only while the current value equals `expected`.
    /// Runs server-side so an expired holder cannot refresh a successor.
    async fn expire_if_equal(&self, key: &str, expected: &str, ttl: Duration) -> Result<bool>;

    /// Delete only while the current value equals `expected`
    async fn del_if_equal(&self, key: &str, expected: &str) -> Result<bool>;

    /// Atomically overwrite a hash: delete, set all entries, set expiry.
    /// An empty `entries` map clears the hash without re-creating it.
    async fn replace_hash(
        &self,
        key: &str,
        entries: &HashMap<String, String>,
        ttl: Duration,
    ) -> Result<()>;

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>>;

    /// Cursor-based SCAN over `pattern`, `batch` keys per round trip
    async fn scan_keys(&self, pattern: &str, batch: usize) -> Result<Vec<String>>;

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>>;
}

const RENEW_SCRIPT: &str = r"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('PEXPIRE', KEYS[1], ARGV[2])
else
    return 0
end
";

const RELEASE_SCRIPT: &str = r"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
else
    return 0
end
";

/// Redis-backed store
pub struct RedisBackend {
    client: redis::Client,
    /// Cached multiplexed connection, reused across operations
    cached_conn: tokio::sync::Mutex<Option<redis::aio::MultiplexedConnection>>,
    op_timeout: Duration,
    renew_script: redis::Script,
    release_script: redis::Script,
}

impl RedisBackend {
    pub fn new(redis_url: &str, op_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| Error::Configuration(format!("Failed to create Redis client: {e}")))?;

        Ok(Self {
            client,
            cached_conn: tokio::sync::Mutex::new(None),
            op_timeout,
            renew_script: redis::Script::new(RENEW_SCRIPT),
            release_script: redis::Script::new(RELEASE_SCRIPT),
        })
    }

    /// Get or create the cached multiplexed Redis connection.
    ///
    /// `MultiplexedConnection` handles concurrent requests internally and
    /// reconnects automatically, so a single instance is reused.
    async fn conn(&self) -> Result<redis::aio::MultiplexedConnection> {
        let mut guard = self.cached_conn.lock().await;
        if let Some(ref conn) = *guard {
            return Ok(conn.clone());
        }
        let conn = timeout(self.op_timeout, self.client.get_multiplexed_async_connection())
            .await
            .map_err(|_| Error::Timeout("Redis connection timed out".to_string()))?
            .map_err(|e| Error::Redis(format!("Redis connection failed: {e}")))?;
        *guard = Some(conn.clone());
        Ok(conn)
    }

    async fn run<T: redis::FromRedisValue>(
        &self,
        what: &str,
        cmd: redis::Cmd,
    ) -> Result<T> {
        let mut conn = self.conn().await?;
        timeout(self.op_timeout, cmd.query_async::<T>(&mut conn))
            .await
            .map_err(|_| Error::Timeout(format!("Redis {what} timed out")))?
            .map_err(|e| Error::Redis(format!("Redis {what} failed: {e}")))
    }
}

#[async_trait]
impl Backend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.run("GET", cmd).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("PX").arg(ttl.as_millis() as u64);
        self.run::<()>("SET", cmd).await
    }

    async fn set_nx_px(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64);
        let reply: Option<String> = self.run("SET NX", cmd).await?;
        Ok(reply.is_some())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);
        self.run::<()>("DEL", cmd).await
    }

    async fn expire_if_equal(&self, key: &str, expected: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn().await?;
        // Script invocation tries EVALSHA first and falls back to EVAL when
        // the script is not yet loaded.
        let result: i64 = timeout(
            self.op_timeout,
            self.renew_script
                .key(key)
                .arg(expected)
                .arg(ttl.as_millis() as u64)
                .invoke_async(&mut conn),
        )
        .await
        .map_err(|_| Error::Timeout("Redis renew script timed out".to_string()))?
        .map_err(|e| Error::Redis(format!("Redis renew script failed: {e}")))?;
        Ok(result == 1)
    }

    async fn del_if_equal(&self, key: &str, expected: &str) -> Result<bool> {
        let mut conn = self.conn().await?;
        let result: i64 = timeout(
            self.op_timeout,
            self.release_script
                .key(key)
                .arg(expected)
                .invoke_async(&mut conn),
        )
        .await
        .map_err(|_| Error::Timeout("Redis release script timed out".to_string()))?
        .map_err(|e| Error::Redis(format!("Redis release script failed: {e}")))?;
        Ok(result == 1)
    }

    async fn replace_hash(
        &self,
        key: &str,
        entries: &HashMap<String, String>,
        ttl: Duration,
    ) -> Result<()> {
        let mut conn = self.conn().await?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.cmd("DEL").arg(key).ignore();
        if !entries.is_empty() {
            let mut hset = redis::cmd("HSET");
            hset.arg(key);
            for (field, value) in entries {
                hset.arg(field).arg(value);
            }
            pipe.add_command(hset).ignore();
            pipe.cmd("PEXPIRE")
                .arg(key)
                .arg(ttl.as_millis() as u64)
                .ignore();
        }
        timeout(self.op_timeout, pipe.query_async::<()>(&mut conn))
            .await
            .map_err(|_| Error::Timeout("Redis hash replace timed out".to_string()))?
            .map_err(|e| Error::Redis(format!("Redis hash replace failed: {e}")))
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut cmd = redis::cmd("HGETALL");
        cmd.arg(key);
        self.run("HGETALL", cmd).await
    }

    async fn scan_keys(&self, pattern: &str, batch: usize) -> Result<Vec<String>> {
        let mut conn = self.conn().await?;
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, chunk): (u64, Vec<String>) = timeout(
                self.op_timeout,
                redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(batch)
                    .query_async(&mut conn),
            )
            .await
            .map_err(|_| Error::Timeout(format!("Redis SCAN timed out at cursor {cursor}")))?
            .map_err(|e| Error::Redis(format!("Redis SCAN failed for {pattern}: {e}")))?;

            cursor = next;
            keys.extend(chunk);

            // cursor 0 means iteration complete
            if cursor == 0 {
                break;
            }
        }

        Ok(keys)
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut cmd = redis::cmd("MGET");
        for key in keys {
            cmd.arg(key);
        }
        self.run("MGET", cmd).await
    }
}
