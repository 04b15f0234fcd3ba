//! Search analytics: bounded event buffers and on-demand metrics.
//!
//! The recorder keeps two ring buffers, one for search events and one
//! for abandonment events. Recording never fails; when a buffer is full
//! the oldest event falls off. Metrics are computed on demand over the
//! most recent window of each buffer rather than maintained
//! incrementally, so a burst of unusual queries ages out of the numbers
//! as fast as it arrived.
//!
//! When constructed with an [`AnalyticsStore`], the recorder mirrors a
//! bounded tail of each buffer to disk after every event and can warm
//! itself from those snapshots at startup. Persistence is best effort:
//! a failed write or a corrupt snapshot logs a warning and the recorder
//! carries on in memory.

use std::collections::{BTreeMap, VecDeque};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::AnalyticsConfig;
use crate::storage::AnalyticsStore;
use crate::text::normalize_query;
use crate::types::{AbandonReason, AbandonmentEvent, SearchCategory, SearchEvent};

/// Windowed performance metrics.
///
/// All numbers describe the recent window, not the full buffers. An
/// empty search window yields the zero value of every field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchMetrics {
    /// Searches in the window.
    pub total_searches: usize,
    /// Mean search latency across the window, in milliseconds.
    pub average_latency_ms: f64,
    /// Query frequency within the window, keyed by normalized query.
    pub popular_queries: BTreeMap<String, usize>,
    /// Search counts per category within the window.
    pub category_distribution: BTreeMap<String, usize>,
    /// Abandonments in the abandonment window divided by searches in
    /// the search window.
    pub abandonment_rate: f64,
    /// Mean time spent before abandoning, in milliseconds.
    pub average_time_to_abandon_ms: f64,
}

/// A query term related to another, with its observed frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedTerm {
    /// Normalized query text.
    pub term: String,
    /// Occurrences within the metrics window.
    pub frequency: usize,
    /// Category the term's searches landed in; mixed terms report
    /// [`SearchCategory::Both`].
    pub category: SearchCategory,
}

/// Bounded recorder of search behavior.
#[derive(Debug)]
pub struct SearchAnalytics {
    searches: VecDeque<SearchEvent>,
    abandonments: VecDeque<AbandonmentEvent>,
    config: AnalyticsConfig,
    store: Option<AnalyticsStore>,
}

impl SearchAnalytics {
    /// Creates an in-memory recorder.
    #[must_use]
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            searches: VecDeque::with_capacity(config.search_capacity.min(1024)),
            abandonments: VecDeque::with_capacity(config.abandonment_capacity.min(1024)),
            config,
            store: None,
        }
    }

    /// Creates a recorder that mirrors event tails to storage.
    #[must_use]
    pub fn with_store(config: AnalyticsConfig, store: AnalyticsStore) -> Self {
        let mut analytics = Self::new(config);
        analytics.store = Some(store);
        analytics
    }

    /// Warms the buffers from persisted snapshots.
    ///
    /// Missing snapshots leave the buffers empty; corrupt ones log a
    /// warning and do the same. Only meaningful before recording starts.
    pub fn load_persisted(&mut self) {
        let Some(store) = &self.store else {
            return;
        };

        match store.load_search_events() {
            Ok(events) => {
                self.searches = tail(events, self.config.search_capacity);
            },
            Err(e) => warn!("Failed to load persisted search events: {e}"),
        }
        match store.load_abandonments() {
            Ok(events) => {
                self.abandonments = tail(events, self.config.abandonment_capacity);
            },
            Err(e) => warn!("Failed to load persisted abandonment events: {e}"),
        }
        debug!(
            "Warmed analytics: {} searches, {} abandonments",
            self.searches.len(),
            self.abandonments.len()
        );
    }

    /// Records one search. Blank queries are kept in the buffer but
    /// never count toward popularity.
    pub fn record_search(
        &mut self,
        query: &str,
        result_count: usize,
        latency_ms: u64,
        category: SearchCategory,
    ) {
        let event = SearchEvent {
            query: normalize_query(query),
            timestamp: Utc::now(),
            result_count,
            latency_ms,
            category,
        };

        self.searches.push_back(event);
        while self.searches.len() > self.config.search_capacity {
            self.searches.pop_front();
        }

        self.persist_searches();
    }

    /// Records one abandonment.
    pub fn record_abandonment(
        &mut self,
        query: &str,
        time_spent_ms: u64,
        results_shown: usize,
        category: SearchCategory,
        reason: AbandonReason,
    ) {
        let event = AbandonmentEvent {
            query: normalize_query(query),
            timestamp: Utc::now(),
            time_spent_ms,
            results_shown,
            category,
            reason,
        };

        self.abandonments.push_back(event);
        while self.abandonments.len() > self.config.abandonment_capacity {
            self.abandonments.pop_front();
        }

        self.persist_abandonments();
    }

    /// Computes metrics over the recent windows.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn metrics(&self) -> SearchMetrics {
        let search_window: Vec<&SearchEvent> = window(&self.searches, self.config.metrics_window);
        if search_window.is_empty() {
            return SearchMetrics::default();
        }
        let abandonment_window: Vec<&AbandonmentEvent> =
            window(&self.abandonments, self.config.abandonment_window);

        let total_searches = search_window.len();
        let latency_sum: u64 = search_window.iter().map(|e| e.latency_ms).sum();
        let average_latency_ms = latency_sum as f64 / total_searches as f64;

        let mut popular_queries = BTreeMap::new();
        let mut category_distribution = BTreeMap::new();
        for event in &search_window {
            if !event.query.is_empty() {
                *popular_queries.entry(event.query.clone()).or_insert(0) += 1;
            }
            *category_distribution
                .entry(event.category.as_str().to_string())
                .or_insert(0) += 1;
        }

        let abandonment_rate = abandonment_window.len() as f64 / total_searches as f64;
        let average_time_to_abandon_ms = if abandonment_window.is_empty() {
            0.0
        } else {
            let spent_sum: u64 = abandonment_window.iter().map(|e| e.time_spent_ms).sum();
            spent_sum as f64 / abandonment_window.len() as f64
        };

        SearchMetrics {
            total_searches,
            average_latency_ms,
            popular_queries,
            category_distribution,
            abandonment_rate,
            average_time_to_abandon_ms,
        }
    }

    /// Whether a query reached the popularity threshold within the
    /// metrics window.
    #[must_use]
    pub fn is_popular(&self, query: &str) -> bool {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return false;
        }

        let count = window(&self.searches, self.config.metrics_window)
            .iter()
            .filter(|e| e.query == normalized)
            .count();
        count >= self.config.popular_threshold
    }

    /// The most frequent queries in the window, busiest first.
    ///
    /// Frequency ties break alphabetically, so the ordering is stable
    /// across calls.
    #[must_use]
    pub fn top_queries(&self, limit: usize) -> Vec<(String, usize)> {
        let mut entries: Vec<(String, usize)> = self.metrics().popular_queries.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(limit);
        entries
    }

    /// Queries related to the given one, for speculative prefetching.
    ///
    /// A term is related when it extends the query as a prefix or
    /// contains it; the query itself never appears. Every prefix
    /// extension outranks every plain containment, and within each
    /// group higher frequency wins.
    #[must_use]
    pub fn related_terms(&self, query: &str, limit: usize) -> Vec<RelatedTerm> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Vec::new();
        }

        let mut categories: BTreeMap<&str, SearchCategory> = BTreeMap::new();
        let mut frequencies: BTreeMap<&str, usize> = BTreeMap::new();
        for event in window(&self.searches, self.config.metrics_window) {
            if event.query.is_empty() {
                continue;
            }
            *frequencies.entry(event.query.as_str()).or_insert(0) += 1;
            categories
                .entry(event.query.as_str())
                .and_modify(|existing| {
                    if *existing != event.category {
                        *existing = SearchCategory::Both;
                    }
                })
                .or_insert(event.category);
        }

        let mut prefix_terms = Vec::new();
        let mut containing_terms = Vec::new();
        for (term, frequency) in &frequencies {
            if *term == normalized {
                continue;
            }
            let related = RelatedTerm {
                term: (*term).to_string(),
                frequency: *frequency,
                category: categories.get(term).copied().unwrap_or(SearchCategory::Both),
            };
            if term.starts_with(&normalized) {
                prefix_terms.push(related);
            } else if term.contains(&normalized) {
                containing_terms.push(related);
            }
        }

        // Frequency orders within a group, never across the boundary
        prefix_terms.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        containing_terms.sort_by(|a, b| b.frequency.cmp(&a.frequency));

        let mut related = prefix_terms;
        related.extend(containing_terms);
        related.truncate(limit);
        related
    }

    /// Search events currently buffered.
    #[must_use]
    pub fn search_event_count(&self) -> usize {
        self.searches.len()
    }

    /// Abandonment events currently buffered.
    #[must_use]
    pub fn abandonment_event_count(&self) -> usize {
        self.abandonments.len()
    }

    /// Drops all events and removes persisted snapshots.
    pub fn clear(&mut self) {
        self.searches.clear();
        self.abandonments.clear();
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                warn!("Failed to clear persisted analytics: {e}");
            }
        }
    }

    fn persist_searches(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let tail: Vec<SearchEvent> = window(&self.searches, self.config.persist_search_tail)
            .into_iter()
            .cloned()
            .collect();
        if let Err(e) = store.save_search_events(&tail) {
            warn!("Failed to persist search analytics: {e}");
        }
    }

    fn persist_abandonments(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let tail: Vec<AbandonmentEvent> =
            window(&self.abandonments, self.config.persist_abandonment_tail)
                .into_iter()
                .cloned()
                .collect();
        if let Err(e) = store.save_abandonments(&tail) {
            warn!("Failed to persist abandonment analytics: {e}");
        }
    }
}

/// The most recent `size` events, oldest first.
fn window<T>(events: &VecDeque<T>, size: usize) -> Vec<&T> {
    let skip = events.len().saturating_sub(size);
    events.iter().skip(skip).collect()
}

/// The last `capacity` events of an owned list, as a buffer.
fn tail<T>(events: Vec<T>, capacity: usize) -> VecDeque<T> {
    let skip = events.len().saturating_sub(capacity);
    events.into_iter().skip(skip).collect()
}
