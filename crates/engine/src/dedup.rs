//! TTL-keyed anomaly dedup cache.
//!
//! Suppresses repeated reporting of the same `enterprise|equipment|severity`
//! triple. Time is injected as epoch milliseconds so every TTL law is
//! testable without sleeping.

use std::collections::HashMap;
use std::time::Duration;

/// One suppressed triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnomalyCacheEntry {
    pub timestamp_ms: i64,
    pub occurrence_count: u32,
    pub last_summary: String,
}

/// TTL-keyed store over dedup triples.
///
/// An entry older than its TTL is treated as absent even when not yet
/// physically removed; probes delete lazily and `sweep` purges in bulk once
/// per cheap-check tick.
#[derive(Debug)]
pub struct AnomalyDedupCache {
    entries: HashMap<String, AnomalyCacheEntry>,
    ttl_ms: i64,
}

impl AnomalyDedupCache {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: HashMap::new(), ttl_ms: ttl.as_millis() as i64 }
    }

    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl_ms = ttl.as_millis() as i64;
    }

    /// True iff an entry exists and `now - entry.timestamp <= ttl`.
    /// An expired entry is deleted on probe.
    pub fn is_duplicate(&mut self, key: &str, now_ms: i64) -> bool {
        match self.entries.get(key) {
            Some(entry) if now_ms - entry.timestamp_ms <= self.ttl_ms => true,
            Some(_) => {
                self.entries.remove(key);
                false
            }
            None => false,
        }
    }

    /// Insert with count 1, or increment and refresh the timestamp on repeat.
    pub fn record(&mut self, key: &str, summary: &str, now_ms: i64) {
        self.entries
            .entry(key.to_string())
            .and_modify(|entry| {
                entry.occurrence_count += 1;
                entry.timestamp_ms = now_ms;
                entry.last_summary = summary.to_string();
            })
            .or_insert_with(|| AnomalyCacheEntry {
                timestamp_ms: now_ms,
                occurrence_count: 1,
                last_summary: summary.to_string(),
            });
    }

    /// Delete everything past TTL. Called once per cheap-check tick.
    pub fn sweep(&mut self, now_ms: i64) {
        let ttl_ms = self.ttl_ms;
        self.entries.retain(|_, entry| now_ms - entry.timestamp_ms <= ttl_ms);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&AnomalyCacheEntry> {
        self.entries.get(key)
    }
}
