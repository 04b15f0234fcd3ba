//! Query result cache with TTL expiry and LRU bounding.
//!
//! Entries are keyed by normalized query text and expire on read: a
//! lookup past the entry's lifetime removes it and reports a miss, so
//! no background sweeper is required (though [`ResultCache::purge_expired`]
//! exists for housekeeping). Marking an entry popular restarts its
//! clock under the longer popular lifetime.
//!
//! The cache holds at most a configured number of entries. Inserting
//! past the bound evicts the least recently used entry, so one burst of
//! one-off queries cannot grow the cache without limit.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::CacheConfig;
use crate::types::Suggestion;

#[derive(Debug, Clone)]
struct CacheEntry {
    suggestions: Vec<Suggestion>,
    stored_at: Instant,
    is_popular: bool,
}

impl CacheEntry {
    fn expired_at(&self, now: Instant, default_ttl: Duration, popular_ttl: Duration) -> bool {
        let ttl = if self.is_popular {
            popular_ttl
        } else {
            default_ttl
        };
        now.saturating_duration_since(self.stored_at) >= ttl
    }
}

/// Bounded cache of ranked suggestion lists.
///
/// Callers are expected to key entries by normalized query text; the
/// cache itself does no folding.
#[derive(Debug)]
pub struct ResultCache {
    entries: LruCache<String, CacheEntry>,
    default_ttl: Duration,
    popular_ttl: Duration,
}

impl ResultCache {
    /// Creates a cache sized and timed by configuration.
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            default_ttl: Duration::from_secs(config.default_ttl_secs),
            popular_ttl: Duration::from_secs(config.popular_ttl_secs),
        }
    }

    /// Looks up fresh results for a key, refreshing its recency.
    ///
    /// An expired entry is removed and reported as a miss. Entries are
    /// fresh while their age is strictly below the applicable lifetime.
    pub fn get(&mut self, key: &str) -> Option<Vec<Suggestion>> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&mut self, key: &str, now: Instant) -> Option<Vec<Suggestion>> {
        let expired = self
            .entries
            .peek(key)?
            .expired_at(now, self.default_ttl, self.popular_ttl);

        if expired {
            self.entries.pop(key);
            debug!("cache entry expired for {key:?}");
            return None;
        }

        self.entries
            .get(key)
            .map(|entry| entry.suggestions.clone())
    }

    /// Whether a fresh entry exists for a key, without touching recency
    /// or evicting an expired one.
    #[must_use]
    pub fn contains_fresh(&self, key: &str) -> bool {
        self.contains_fresh_at(key, Instant::now())
    }

    fn contains_fresh_at(&self, key: &str, now: Instant) -> bool {
        self.entries
            .peek(key)
            .is_some_and(|entry| !entry.expired_at(now, self.default_ttl, self.popular_ttl))
    }

    /// Stores results for a key, overwriting any previous entry.
    ///
    /// A fresh insert always starts as non-popular; the owner re-marks
    /// the entry after consulting analytics.
    pub fn insert(&mut self, key: String, suggestions: Vec<Suggestion>) {
        self.insert_at(key, suggestions, Instant::now());
    }

    fn insert_at(&mut self, key: String, suggestions: Vec<Suggestion>, now: Instant) {
        self.entries.put(
            key,
            CacheEntry {
                suggestions,
                stored_at: now,
                is_popular: false,
            },
        );
    }

    /// Extends an entry's lifetime to the popular window.
    ///
    /// Returns whether the entry was present. The entry's clock restarts
    /// at the marking, so it lives a full popular lifetime from here.
    pub fn mark_popular(&mut self, key: &str) -> bool {
        self.mark_popular_at(key, Instant::now())
    }

    fn mark_popular_at(&mut self, key: &str, now: Instant) -> bool {
        match self.entries.peek_mut(key) {
            Some(entry) => {
                entry.is_popular = true;
                entry.stored_at = now;
                true
            },
            None => false,
        }
    }

    /// Drops every expired entry, returning how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn purge_expired_at(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.expired_at(now, self.default_ttl, self.popular_ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.pop(key);
        }
        if !expired.is_empty() {
            debug!("purged {} expired cache entries", expired.len());
        }
        expired.len()
    }

    /// Entries currently held, fresh or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum entries the cache will hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
