//! The public suggestion surface.
//!
//! [`SuggestService`] owns every collaborator in the pipeline: the
//! static snapshot cache, the remote store, the result cache, the
//! analytics recorder, and the prefetcher. A suggestion lookup walks
//! them in a fixed order, and no failure along the way escapes to the
//! caller; the worst possible outcome is an empty list.
//!
//! Lookup order for a non-blank query:
//!
//! 1. the static cache, when preferred and warmed, wins if it has any
//!    match at all;
//! 2. a fresh result-cache entry under the normalized query;
//! 3. the remote store, ranked and cached on the way out;
//! 4. on store failure, the static cache again, and finally nothing.
//!
//! Every served search records exactly one analytics event. Related
//! queries are prefetched on a background task after static and store
//! hits, so follow-up lookups land in the result cache.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::Result;
use crate::analytics::{RelatedTerm, SearchAnalytics, SearchMetrics};
use crate::config::Config;
use crate::normalize::{normalize_characters, normalize_weapons};
use crate::prefetch::{PrefetchStatus, Prefetcher};
use crate::rank::filter_and_rank;
use crate::result_cache::ResultCache;
use crate::snapshot::{SnapshotInfo, StaticCache};
use crate::storage::AnalyticsStore;
use crate::store::{CombinedPayload, StoreClient};
use crate::text::normalize_query;
use crate::types::{AbandonReason, SearchCategory, Suggestion, SuggestionKind};

/// Remote lookup used by the suggest pipeline.
///
/// [`StoreClient`] is the production implementation; tests substitute
/// scripted sources. The returned future must be `Send` so prefetch
/// work can run on spawned tasks.
pub trait SuggestionSource {
    /// Fetch characters and weapons matching a term in one round trip.
    fn combined_suggest(&self, term: &str)
    -> impl Future<Output = Result<CombinedPayload>> + Send;
}

impl SuggestionSource for StoreClient {
    fn combined_suggest(
        &self,
        term: &str,
    ) -> impl Future<Output = Result<CombinedPayload>> + Send {
        Self::combined_suggest(self, term)
    }
}

struct Inner<S> {
    config: Config,
    source: S,
    static_cache: StaticCache,
    result_cache: RwLock<ResultCache>,
    analytics: RwLock<SearchAnalytics>,
    prefetcher: Prefetcher,
}

/// Handle to the suggestion pipeline. Cheap to clone; clones share
/// every cache and the recorder.
pub struct SuggestService<S = StoreClient> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for SuggestService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SuggestService<StoreClient> {
    /// Builds the production pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP
    /// client cannot be constructed. Analytics persistence failures
    /// are not errors; the recorder falls back to memory only.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let source = StoreClient::new(&config.store, config.search.per_kind_fetch_cap)?;
        Ok(Self::with_source(config, source))
    }

    /// Resolves ordered suggestions of a single kind through the
    /// per-kind stored queries (`character-search` / `weapon-search`).
    ///
    /// Unlike [`Self::search_suggestions`], this goes to the store
    /// first; the static tier is only a fallback when the fetch fails.
    /// Never fails: outages degrade to the static tier filtered by
    /// kind, then to an empty list. Records one analytics event under
    /// the kind's category.
    pub async fn search_kind(
        &self,
        query: &str,
        kind: SuggestionKind,
        limit: usize,
    ) -> Vec<Suggestion> {
        let started = Instant::now();
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Vec::new();
        }

        let fetched = match kind {
            SuggestionKind::Character => self
                .inner
                .source
                .search_characters(&normalized, limit)
                .await
                .map(|records| {
                    let batch = normalize_characters(records);
                    batch.log_issues();
                    batch.suggestions
                }),
            SuggestionKind::Weapon => self
                .inner
                .source
                .search_weapons(&normalized, limit)
                .await
                .map(|records| {
                    let batch = normalize_weapons(records);
                    batch.log_issues();
                    batch.suggestions
                }),
        };

        let results = match fetched {
            Ok(items) => filter_and_rank(items, &normalized, limit),
            Err(e) => {
                warn!("{kind} search failed for {normalized:?}: {e}");
                self.static_kind_fallback(query, kind, limit).await
            },
        };

        let category = match kind {
            SuggestionKind::Character => SearchCategory::Character,
            SuggestionKind::Weapon => SearchCategory::Weapon,
        };
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.inner
            .analytics
            .write()
            .await
            .record_search(&normalized, results.len(), latency_ms, category);
        results
    }

    async fn static_kind_fallback(
        &self,
        query: &str,
        kind: SuggestionKind,
        limit: usize,
    ) -> Vec<Suggestion> {
        if !self.inner.static_cache.is_available().await {
            return Vec::new();
        }
        let mut matches: Vec<Suggestion> = self
            .inner
            .static_cache
            .instant_suggestions(query, usize::MAX)
            .await
            .into_iter()
            .filter(|s| s.kind == kind)
            .collect();
        matches.truncate(limit);
        matches
    }
}

impl<S> SuggestService<S>
where
    S: SuggestionSource + Send + Sync + 'static,
{
    /// Builds the pipeline around a caller-supplied remote source.
    ///
    /// The analytics recorder persists under `config.paths`; when the
    /// data directory cannot be prepared it runs in memory only.
    #[must_use]
    pub fn with_source(config: Config, source: S) -> Self {
        let analytics = match AnalyticsStore::new(&config.paths) {
            Ok(store) => {
                let mut analytics = SearchAnalytics::with_store(config.analytics.clone(), store);
                analytics.load_persisted();
                analytics
            },
            Err(e) => {
                warn!("Analytics persistence unavailable, recording in memory only: {e}");
                SearchAnalytics::new(config.analytics.clone())
            },
        };

        Self {
            inner: Arc::new(Inner {
                static_cache: StaticCache::new(),
                result_cache: RwLock::new(ResultCache::new(&config.cache)),
                analytics: RwLock::new(analytics),
                prefetcher: Prefetcher::new(&config.prefetch),
                source,
                config,
            }),
        }
    }

    /// The configuration this service was built from.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Warms the static suggestion cache. Idempotent and infallible;
    /// when loading fails the static tier stays unavailable and lookups
    /// lean on the store.
    pub async fn initialize(&self) -> bool {
        self.inner
            .static_cache
            .initialize(&self.inner.config.paths)
            .await
    }

    /// Resolves ordered suggestions for a query.
    ///
    /// Never fails: a blank query, a cold pipeline, or a store outage
    /// all resolve to an empty list.
    pub async fn search_suggestions(
        &self,
        query: &str,
        limit: usize,
        prefer_static_first: bool,
    ) -> Vec<Suggestion> {
        let started = Instant::now();
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Vec::new();
        }

        if prefer_static_first && self.inner.static_cache.is_available().await {
            let instant = self.inner.static_cache.instant_suggestions(query, limit).await;
            if !instant.is_empty() {
                self.record_search(&normalized, &instant, started).await;
                self.spawn_prefetch(normalized);
                return instant;
            }
        }

        let cached = {
            let mut cache = self.inner.result_cache.write().await;
            cache.get(&normalized)
        };
        if let Some(mut hit) = cached {
            debug!("result cache hit for {normalized:?}");
            hit.truncate(limit);
            self.record_search(&normalized, &hit, started).await;
            return hit;
        }

        match self.fetch_ranked(&normalized, limit).await {
            Ok(results) => {
                {
                    let mut cache = self.inner.result_cache.write().await;
                    cache.insert(normalized.clone(), results.clone());
                }
                self.record_search(&normalized, &results, started).await;
                if self.inner.analytics.read().await.is_popular(&normalized) {
                    self.inner.result_cache.write().await.mark_popular(&normalized);
                }
                self.spawn_prefetch(normalized);
                results
            },
            Err(e) => {
                warn!("Suggestion fetch failed for {normalized:?}: {e}");
                let fallback = if self.inner.static_cache.is_available().await {
                    self.inner.static_cache.instant_suggestions(query, limit).await
                } else {
                    Vec::new()
                };
                self.record_search(&normalized, &fallback, started).await;
                fallback
            },
        }
    }

    /// Fetches result-cache entries for every term related to a query.
    ///
    /// Terms already cached or already in flight are skipped, and a full
    /// in-flight set skips the whole batch. Awaits completion; the
    /// suggest path runs this on a spawned task instead.
    pub async fn prefetch_related(&self, query: &str) {
        let related = {
            let analytics = self.inner.analytics.read().await;
            analytics.related_terms(query, self.inner.config.analytics.related_limit)
        };
        if related.is_empty() {
            return;
        }

        let to_fetch: Vec<RelatedTerm> = {
            let cache = self.inner.result_cache.read().await;
            related
                .into_iter()
                .filter(|r| !cache.contains_fresh(&r.term))
                .collect()
        };
        if to_fetch.is_empty() {
            return;
        }

        let service = self.clone();
        self.inner
            .prefetcher
            .prefetch_related(&to_fetch, move |term| {
                let service = service.clone();
                async move { service.warm_term(&term).await.map(|_| ()) }
            })
            .await;
    }

    /// Fetches, ranks, and caches results for one term, bypassing the
    /// static tier. Returns how many suggestions were stored.
    ///
    /// # Errors
    ///
    /// Returns an error when the store fetch or payload decode fails;
    /// the cache is left untouched in that case.
    pub async fn warm_term(&self, term: &str) -> Result<usize> {
        let normalized = normalize_query(term);
        if normalized.is_empty() {
            return Ok(0);
        }

        let results = self.fetch_ranked(&normalized, self.inner.config.search.default_limit).await?;
        let count = results.len();
        let popular = self.inner.analytics.read().await.is_popular(&normalized);
        {
            let mut cache = self.inner.result_cache.write().await;
            cache.insert(normalized.clone(), results);
            if popular {
                cache.mark_popular(&normalized);
            }
        }
        debug!("warmed {count} suggestions for {normalized:?}");
        Ok(count)
    }

    /// Records that a search session ended without the user acting on a
    /// result.
    pub async fn record_abandonment(
        &self,
        query: &str,
        time_spent_ms: u64,
        results_shown: usize,
        category: SearchCategory,
        reason: AbandonReason,
    ) {
        let mut analytics = self.inner.analytics.write().await;
        analytics.record_abandonment(query, time_spent_ms, results_shown, category, reason);
    }

    /// Windowed metrics from the analytics recorder.
    pub async fn metrics(&self) -> SearchMetrics {
        self.inner.analytics.read().await.metrics()
    }

    /// Terms related to a query, most frequent first.
    pub async fn related_terms(&self, query: &str, limit: usize) -> Vec<RelatedTerm> {
        self.inner.analytics.read().await.related_terms(query, limit)
    }

    /// Most frequent recent queries with their counts.
    pub async fn top_queries(&self, limit: usize) -> Vec<(String, usize)> {
        self.inner.analytics.read().await.top_queries(limit)
    }

    /// Admission state of the prefetcher.
    pub async fn prefetch_status(&self) -> PrefetchStatus {
        self.inner.prefetcher.status().await
    }

    /// Entries currently held in the result cache.
    pub async fn cache_len(&self) -> usize {
        self.inner.result_cache.read().await.len()
    }

    /// Drops expired result-cache entries, returning how many went.
    pub async fn purge_expired(&self) -> usize {
        self.inner.result_cache.write().await.purge_expired()
    }

    /// Details of the loaded static snapshot, if any.
    pub async fn snapshot_info(&self) -> Option<SnapshotInfo> {
        self.inner.static_cache.info().await
    }

    async fn fetch_ranked(&self, normalized: &str, limit: usize) -> Result<Vec<Suggestion>> {
        let payload = self.inner.source.combined_suggest(normalized).await?;
        debug!(
            "store returned {} characters, {} weapons for {normalized:?}",
            payload.characters.len(),
            payload.weapons.len()
        );

        let characters = normalize_characters(payload.characters);
        characters.log_issues();
        let weapons = normalize_weapons(payload.weapons);
        weapons.log_issues();

        let items = characters
            .suggestions
            .into_iter()
            .chain(weapons.suggestions);
        Ok(filter_and_rank(items, normalized, limit))
    }

    async fn record_search(&self, normalized: &str, results: &[Suggestion], started: Instant) {
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let category = SearchCategory::of(results);
        let mut analytics = self.inner.analytics.write().await;
        analytics.record_search(normalized, results.len(), latency_ms, category);
    }

    fn spawn_prefetch(&self, query: String) {
        let service = self.clone();
        tokio::spawn(async move {
            service.prefetch_related(&query).await;
        });
    }
}
