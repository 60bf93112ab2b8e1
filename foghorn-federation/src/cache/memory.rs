//! In-memory backend with a fast-forwardable clock, used by tests to
//! exercise TTL and lease semantics without a Redis server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::backend::Backend;
use crate::error::Result;

#[derive(Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
}

#[derive(Clone)]
struct Entry {
    value: Value,
    /// Absolute expiry on the fake clock, in milliseconds
    expires_at_ms: Option<u64>,
}

#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Entry>>,
    now_ms: AtomicU64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-forward the fake clock
    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    fn now(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn live_value(&self, key: &str) -> Option<Value> {
        let now = self.now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) => {
                if entry.expires_at_ms.is_some_and(|at| at <= now) {
                    entries.remove(key);
                    None
                } else {
                    Some(entry.value.clone())
                }
            }
            None => None,
        }
    }

    fn expiry(&self, ttl: Duration) -> Option<u64> {
        Some(self.now() + ttl.as_millis() as u64)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(match self.live_value(key) {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        })
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries.lock().insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at_ms: self.expiry(ttl),
            },
        );
        Ok(())
    }

    async fn set_nx_px(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        if self.live_value(key).is_some() {
            return Ok(false);
        }
        self.set_ex(key, value, ttl).await?;
        Ok(true)
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn expire_if_equal(&self, key: &str, expected: &str, ttl: Duration) -> Result<bool> {
        match self.live_value(key) {
            Some(Value::Str(current)) if current == expected => {
                let expiry = self.expiry(ttl);
                if let Some(entry) = self.entries.lock().get_mut(key) {
                    entry.expires_at_ms = expiry;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn del_if_equal(&self, key: &str, expected: &str) -> Result<bool> {
        match self.live_value(key) {
            Some(Value::Str(current)) if current == expected => {
                self.entries.lock().remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn replace_hash(
        &self,
        key: &str,
        entries: &HashMap<String, String>,
        ttl: Duration,
    ) -> Result<()> {
        let mut map = self.entries.lock();
        if entries.is_empty() {
            map.remove(key);
        } else {
            map.insert(
                key.to_string(),
                Entry {
                    value: Value::Hash(entries.clone()),
                    expires_at_ms: self.expiry(ttl),
                },
            );
        }
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        Ok(match self.live_value(key) {
            Some(Value::Hash(h)) => h,
            _ => HashMap::new(),
        })
    }

    async fn scan_keys(&self, pattern: &str, _batch: usize) -> Result<Vec<String>> {
        // Patterns used by the cache are always `<prefix>*`
        let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
        let now = self.now();
        Ok(self
            .entries
            .lock()
            .iter()
            .filter(|(_, e)| !e.expires_at_ms.is_some_and(|at| at <= now))
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            out.push(match self.live_value(key) {
                Some(Value::Str(s)) => Some(s),
                _ => None,
            });
        }
        Ok(out)
    }
}
