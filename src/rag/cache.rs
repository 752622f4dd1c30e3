//! Answer cache
//!
//! Generated answers are cached per `(user, document filter, k, question)` so a
//! repeated question skips both retrieval and the LLM call. Entries expire after
//! a TTL, the cache is bounded, and a user's entries are dropped whenever that
//! user's documents change. Each user also carries a generation number that
//! invalidation bumps, so an answer computed before a change is never stored
//! after it.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use dashmap::DashMap;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use tracing::debug;
use tracing::info;

use super::pipeline::RagResponse;

/// Cache entry with TTL support
#[derive(Debug, Clone)]
struct CacheEntry {
    user_id: String,
    data: RagResponse,
    inserted_at: Instant,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(user_id: &str, data: RagResponse, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            user_id: user_id.to_string(),
            data,
            inserted_at: now,
            expires_at: now + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expired_cleanups: u64,
    pub entries: usize,
    pub max_entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// In-memory cache of generated answers
#[derive(Clone)]
pub struct AnswerCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    generations: Arc<DashMap<String, u64>>,
    ttl: Duration,
    max_entries: usize,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    evictions: Arc<AtomicU64>,
    expired_cleanups: Arc<AtomicU64>,
}

impl AnswerCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            generations: Arc::new(DashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            evictions: Arc::new(AtomicU64::new(0)),
            expired_cleanups: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Build from the `[cache]` section; `None` when caching is disabled
    pub fn from_config(config: &crate::config::CacheConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(Duration::from_secs(config.ttl_secs), config.max_entries))
    }

    /// Hex SHA-256 over the inputs that determine an answer
    pub fn key(user_id: &str, doc_id: Option<&str>, top_k: usize, question: &str) -> String {
        let mut hasher = Sha256::new();
        for part in [user_id, doc_id.unwrap_or(""), &top_k.to_string(), question.trim()] {
            hasher.update(part.as_bytes());
            // Separator keeps ("ab", "c") and ("a", "bc") apart
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }

    pub fn get(&self, key: &str) -> Option<RagResponse> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Answer cache hit for {}", &key[..key.len().min(12)]);
                return Some(entry.data.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
            self.expired_cleanups.fetch_add(1, Ordering::Relaxed);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn insert(&self, key: String, user_id: &str, response: RagResponse) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.make_room();
        }
        self.entries
            .insert(key, CacheEntry::new(user_id, response, self.ttl));
    }

    /// Current generation of a user's documents, read before computing an answer
    pub fn generation(&self, user_id: &str) -> u64 {
        self.generations.get(user_id).map_or(0, |g| *g)
    }

    /// Store an answer only if the user's documents have not changed since
    /// `generation` was read; returns whether it was stored
    pub fn insert_if_current(
        &self,
        key: String,
        user_id: &str,
        generation: u64,
        response: RagResponse,
    ) -> bool {
        // Holding the generation entry keeps invalidation from interleaving
        let current = self.generations.entry(user_id.to_string()).or_insert(0);
        if *current != generation {
            debug!("Skipping stale answer for user {}", user_id);
            return false;
        }
        self.insert(key, user_id, response);
        drop(current);
        true
    }

    /// Drop every cached answer for a user
    pub fn invalidate_user(&self, user_id: &str) -> usize {
        *self.generations.entry(user_id.to_string()).or_insert(0) += 1;
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.user_id != user_id);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!("Invalidated {} cached answers for user {}", removed, user_id);
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
        info!("Cleared all cached answers");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expired_cleanups: self.expired_cleanups.load(Ordering::Relaxed),
            entries: self.entries.len(),
            max_entries: self.max_entries,
        }
    }

    /// Remove expired entries; returns how many were dropped
    pub fn cleanup_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            self.expired_cleanups
                .fetch_add(removed as u64, Ordering::Relaxed);
            debug!("Cleaned up {} expired cache entries", removed);
        }
        removed
    }

    /// Purge expired entries every `interval` until the runtime shuts down
    pub fn start_cleanup_task(&self, interval: Duration) {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                cache.cleanup_expired();
            }
        });
    }

    /// Expired entries go first, then the oldest one
    fn make_room(&self) {
        if self.cleanup_expired() > 0 && self.entries.len() < self.max_entries {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.inserted_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!("Evicted oldest cached answer");
        }
    }
}
