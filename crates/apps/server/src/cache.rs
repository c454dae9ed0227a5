use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// Rendered JSON bodies keyed by endpoint and parameters, each valid for `ttl`.
/// Holds at most `capacity` entries; a new key evicts the oldest one.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    capacity: usize,
    entries: DashMap<String, (Instant, String)>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        {
            // The read guard must be gone before `remove` locks the shard.
            let entry = self.entries.get(key)?;
            let (stored, body) = entry.value();
            if now.saturating_duration_since(*stored) < self.ttl {
                return Some(body.clone());
            }
        }
        self.entries.remove(key);
        None
    }

    pub fn insert(&self, key: impl Into<String>, body: String) {
        self.insert_at(key.into(), body, Instant::now());
    }

    fn insert_at(&self, key: String, body: String, now: Instant) {
        if self.capacity == 0 {
            return;
        }
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.purge_expired_at(now);
            while self.entries.len() >= self.capacity {
                let Some(oldest) = self.oldest_key() else {
                    break;
                };
                debug!(key = oldest.as_str(), "evicting oldest cached response");
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(key, (now, body));
    }

    fn oldest_key(&self) -> Option<String> {
        // Cloned out so no shard guard outlives the scan.
        self.entries
            .iter()
            .min_by_key(|entry| entry.value().0)
            .map(|entry| entry.key().clone())
    }

    /// Returns the cached body, or renders, stores and returns a fresh one.
    /// Failed renders are not stored.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: &str,
        render: impl FnOnce() -> Result<String, E>,
    ) -> Result<String, E> {
        if let Some(body) = self.get(key) {
            return Ok(body);
        }
        let body = render()?;
        self.insert(key, body.clone());
        Ok(body)
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        self.purge_expired_at(Instant::now());
    }

    fn purge_expired_at(&self, now: Instant) {
        self.entries
            .retain(|_, (stored, _)| now.saturating_duration_since(*stored) < self.ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
