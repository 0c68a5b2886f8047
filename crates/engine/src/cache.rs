//! In-process read cache with per-entry TTL and explicit invalidation.
//!
//! The cache is advisory: it only accelerates read-mostly profile queries.
//! Mutation paths always re-read the ledger and invalidate (never update in
//! place), so a snapshot computed before a concurrent mutation landed can
//! never be re-cached as current. Values are stored serialized; a snapshot
//! that fails to decode is dropped and treated as a miss.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// TTL applied to cached profile snapshots.
pub const PROFILE_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

struct Entry {
    payload: String,
    expires_at: Instant,
}

/// Shared key/value store. Cloning is cheap and clones share the entries.
#[derive(Clone, Default)]
pub struct Cache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value, or `None` on miss or expiry.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock();
        let entry = entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            entries.remove(key);
            return None;
        }
        match serde_json::from_str(&entry.payload) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("dropping undecodable cache entry {key}: {err}");
                entries.remove(key);
                None
            }
        }
    }

    /// Stores `value` under `key` for `ttl`. Serialization failures are
    /// logged and skipped: the cache must never block its caller.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!("failed to serialize cache entry {key}: {err}");
                return;
            }
        };
        let entry = Entry {
            payload,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().insert(key.to_string(), entry);
    }

    pub fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

/// Cache key builder.
pub struct CacheKey;

impl CacheKey {
    pub fn profile(account_id: Uuid) -> String {
        format!("profile:{account_id}")
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        balance_minor: i64,
    }

    #[test]
    fn set_then_get_returns_value() {
        let cache = Cache::new();
        cache.set("k", &Snapshot { balance_minor: 42 }, Duration::from_secs(60));
        assert_eq!(
            cache.get::<Snapshot>("k"),
            Some(Snapshot { balance_minor: 42 })
        );
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let cache = Cache::new();
        cache.set("k", &Snapshot { balance_minor: 42 }, Duration::ZERO);
        assert_eq!(cache.get::<Snapshot>("k"), None);
    }

    #[test]
    fn delete_removes_entry_before_ttl() {
        let cache = Cache::new();
        cache.set("k", &Snapshot { balance_minor: 42 }, Duration::from_secs(60));
        cache.delete("k");
        assert_eq!(cache.get::<Snapshot>("k"), None);
    }

    #[test]
    fn clones_share_entries() {
        let cache = Cache::new();
        let clone = cache.clone();
        clone.set("k", &Snapshot { balance_minor: 7 }, Duration::from_secs(60));
        assert_eq!(
            cache.get::<Snapshot>("k"),
            Some(Snapshot { balance_minor: 7 })
        );
    }

    #[test]
    fn profile_key_format() {
        let id = Uuid::nil();
        assert_eq!(
            CacheKey::profile(id),
            "profile:00000000-0000-0000-0000-000000000000"
        );
    }
}
