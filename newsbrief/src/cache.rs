//! Time-bounded response cache keyed by request fingerprint.
//!
//! Entries expire lazily: an expired entry is removed the next time its key is
//! looked up. There is no background sweep and no capacity bound.

use dashmap::DashMap;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

/// Query parameters in a stable (sorted) order
pub type Params = BTreeMap<String, String>;

/// Deterministic cache key for a request: SHA-256 over the JSON encoding of
/// the endpoint URL and the sorted parameters, hex encoded. JSON quoting keeps
/// distinct parameter sets distinct. The raw query (which carries the API key)
/// never appears in the key.
pub fn fingerprint(url: &str, params: &Params) -> String {
    let canonical = serde_json::json!({ "url": url, "params": params }).to_string();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    value: Value,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) > ttl
    }
}

/// Process-wide response cache. Cheap to share behind an `Arc`; operations on
/// different keys never contend on a single lock.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the stored value unless it is older than the TTL, in which case
    /// the entry is evicted and `None` is returned.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired(now, self.ttl))
            .is_some()
        {
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry. Never called automatically.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
        before.saturating_sub(self.entries.len())
    }
}
