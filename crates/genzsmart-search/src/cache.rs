// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-boxed cache of search responses keyed by request fingerprint.
//!
//! Entries are immutable once written. Two concurrent misses for the same
//! fingerprint may both reach the backend; the second write simply replaces
//! an equivalent response.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use genzsmart_core::traits::SearchParams;
use genzsmart_core::types::{SearchResponse, SearchType};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Source of the current time, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic cache key for a search request.
///
/// Extra parameters are already ordered by key since [`SearchParams`] is a
/// `BTreeMap`.
pub fn fingerprint(
    query: &str,
    provider: &str,
    search_type: SearchType,
    params: &SearchParams,
) -> String {
    let extras = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",");
    let raw = format!("{query}:{provider}:{search_type}:{extras}");
    hex::encode(Sha256::digest(raw.as_bytes()))
}

struct Entry {
    response: SearchResponse,
    stored_at: DateTime<Utc>,
}

/// Entry counts reported by [`SearchCache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}

pub struct SearchCache {
    entries: Mutex<HashMap<String, Entry>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl SearchCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_fresh(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        now - entry.stored_at < self.ttl
    }

    /// Returns a copy of the cached response marked `cached = true`, or
    /// `None` on a miss. An expired entry is evicted.
    pub fn get(&self, key: &str) -> Option<SearchResponse> {
        let now = self.clock.now();
        let mut entries = self.lock();
        let fresh = entries.get(key).map(|entry| self.is_fresh(entry, now))?;
        if !fresh {
            entries.remove(key);
            debug!(key, "evicted expired search cache entry");
            return None;
        }
        entries.get(key).map(|entry| {
            let mut response = entry.response.clone();
            response.cached = true;
            response
        })
    }

    /// Stores `response` under `key`, evicting every expired entry first.
    pub fn insert(&self, key: String, response: SearchResponse) {
        let stored_at = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, stored_at));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "evicted expired search cache entries");
        }
        entries.insert(key, Entry { response, stored_at });
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.lock();
        let valid = entries.values().filter(|e| self.is_fresh(e, now)).count();
        CacheStats {
            total_entries: entries.len(),
            valid_entries: valid,
            expired_entries: entries.len() - valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        fn advance(&self, by: chrono::Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn response() -> SearchResponse {
        SearchResponse::new("q", "brave", Vec::new(), 0.1)
    }

    #[test]
    fn fingerprint_is_stable_and_sensitive() {
        let mut params = SearchParams::new();
        params.insert("b".into(), "2".into());
        params.insert("a".into(), "1".into());

        let key = fingerprint("rust", "brave", SearchType::General, &params);
        assert_eq!(key.len(), 64);
        assert_eq!(key, fingerprint("rust", "brave", SearchType::General, &params));
        assert_ne!(key, fingerprint("rust", "serpapi", SearchType::General, &params));
        assert_ne!(key, fingerprint("rust", "brave", SearchType::News, &params));
        assert_ne!(key, fingerprint("rust", "brave", SearchType::General, &SearchParams::new()));
    }

    #[test]
    fn entries_expire_after_ttl() {
        let clock = Arc::new(FixedClock(Mutex::new(Utc::now())));
        let cache = SearchCache::with_clock(Duration::from_secs(60), clock.clone());

        cache.insert("k".into(), response());
        let hit = cache.get("k").unwrap();
        assert!(hit.cached);

        clock.advance(chrono::Duration::seconds(61));
        assert_eq!(
            cache.stats(),
            CacheStats {
                total_entries: 1,
                valid_entries: 0,
                expired_entries: 1
            }
        );
        assert!(cache.get("k").is_none());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn clear_drops_everything() {
        let cache = SearchCache::new(Duration::from_secs(3600));
        cache.insert("a".into(), response());
        cache.insert("b".into(), response());
        assert_eq!(cache.stats().valid_entries, 2);
        cache.clear();
        assert!(cache.get("a").is_none());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn insert_sweeps_expired_entries() {
        let clock = Arc::new(FixedClock(Mutex::new(Utc::now())));
        let cache = SearchCache::with_clock(Duration::from_secs(60), clock.clone());

        cache.insert("old-1".into(), response());
        cache.insert("old-2".into(), response());
        clock.advance(chrono::Duration::seconds(30));
        cache.insert("recent".into(), response());
        clock.advance(chrono::Duration::seconds(31));

        cache.insert("new".into(), response());
        assert_eq!(
            cache.stats(),
            CacheStats {
                total_entries: 2,
                valid_entries: 2,
                expired_entries: 0
            }
        );
        assert!(cache.get("recent").is_some());
        assert!(cache.get("old-1").is_none());
    }
}
