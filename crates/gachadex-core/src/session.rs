//! Debounced typeahead sessions.
//!
//! A [`TypeaheadSession`] sits between a stream of keystrokes and the
//! suggest pipeline. Each input restarts a debounce delay, and only the
//! input that survives the delay reaches the service. Because fetches
//! overlap, every input is stamped with a monotonically increasing
//! token; a completion whose token is no longer the latest is dropped
//! unseen. The in-flight fetch itself is never cancelled, it just loses
//! the right to publish.
//!
//! Consumers watch a [`SessionUpdate`] channel that always carries the
//! newest published state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use crate::service::{SuggestService, SuggestionSource};
use crate::store::StoreClient;
use crate::text::normalize_query;
use crate::types::Suggestion;

/// Newest published state of a typeahead session.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    /// Token of the input that produced this state. Zero until the
    /// first publish.
    pub token: u64,
    /// The raw input the suggestions answer.
    pub query: String,
    /// Ordered suggestions for the query.
    pub suggestions: Vec<Suggestion>,
}

/// A debounced, staleness-guarded view over [`SuggestService`].
pub struct TypeaheadSession<S = StoreClient> {
    service: SuggestService<S>,
    debounce: Duration,
    limit: usize,
    prefer_static_first: bool,
    latest_token: Arc<AtomicU64>,
    updates: watch::Sender<SessionUpdate>,
}

impl<S> Clone for TypeaheadSession<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            debounce: self.debounce,
            limit: self.limit,
            prefer_static_first: self.prefer_static_first,
            latest_token: Arc::clone(&self.latest_token),
            updates: self.updates.clone(),
        }
    }
}

impl<S> TypeaheadSession<S>
where
    S: SuggestionSource + Send + Sync + 'static,
{
    /// Builds a session with the service's configured debounce delay
    /// and suggestion limit, preferring the static tier.
    #[must_use]
    pub fn new(service: SuggestService<S>) -> Self {
        let debounce = service.config().debounce();
        let limit = service.config().search.default_limit;
        let (updates, _) = watch::channel(SessionUpdate::default());
        Self {
            service,
            debounce,
            limit,
            prefer_static_first: true,
            latest_token: Arc::new(AtomicU64::new(0)),
            updates,
        }
    }

    /// Overrides the suggestion limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Overrides the debounce delay.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Controls whether lookups prefer the static tier.
    #[must_use]
    pub const fn with_static_first(mut self, prefer: bool) -> Self {
        self.prefer_static_first = prefer;
        self
    }

    /// Feeds one keystroke's worth of input, superseding any pending
    /// lookup. Returns the token issued to this input.
    ///
    /// A blank input publishes an empty update right away; anything
    /// else publishes after the debounce delay, unless a newer input
    /// arrives first.
    pub fn input(&self, query: &str) -> u64 {
        let token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;

        if normalize_query(query).is_empty() {
            let _ = self.updates.send(SessionUpdate {
                token,
                query: query.to_string(),
                suggestions: Vec::new(),
            });
            return token;
        }

        let session = self.clone();
        let query = query.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(session.debounce).await;
            if session.latest_token.load(Ordering::SeqCst) != token {
                return;
            }

            let suggestions = session
                .service
                .search_suggestions(&query, session.limit, session.prefer_static_first)
                .await;

            if session.latest_token.load(Ordering::SeqCst) != token {
                debug!("dropping stale suggestions for {query:?}");
                return;
            }
            let _ = session.updates.send(SessionUpdate {
                token,
                query,
                suggestions,
            });
        });
        token
    }

    /// Subscribes to published updates. The receiver always starts at
    /// the most recent state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    /// Token of the newest input seen so far.
    #[must_use]
    pub fn latest_token(&self) -> u64 {
        self.latest_token.load(Ordering::SeqCst)
    }

    /// The service this session queries.
    #[must_use]
    pub const fn service(&self) -> &SuggestService<S> {
        &self.service
    }
}
