//! Speculative prefetching of related queries.
//!
//! After a search, the owner may warm the result cache for terms the
//! analytics recorder considers related. The prefetcher only does
//! admission control: it tracks which terms are being fetched and
//! refuses new work past a configured bound, so speculation can never
//! monopolize the store connection. The fetch itself is injected by the
//! caller, which keeps cache and store wiring out of this module.
//!
//! A term is removed from the in-flight set whether its fetch succeeds
//! or fails; failures are logged and otherwise ignored.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::Result;
use crate::analytics::RelatedTerm;
use crate::config::PrefetchConfig;

/// Snapshot of the prefetcher's admission state.
#[derive(Debug, Clone, Serialize)]
pub struct PrefetchStatus {
    /// Terms currently being fetched.
    pub in_flight: usize,
    /// Admission bound.
    pub capacity: usize,
    /// Whether new prefetch work would be refused right now.
    pub is_full: bool,
}

/// Bounded speculative fetcher.
#[derive(Debug)]
pub struct Prefetcher {
    in_flight: Arc<Mutex<HashSet<String>>>,
    max_in_flight: usize,
}

impl Prefetcher {
    /// Creates a prefetcher with the configured admission bound.
    #[must_use]
    pub fn new(config: &PrefetchConfig) -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            max_in_flight: config.max_in_flight,
        }
    }

    /// Fetches related terms one by one through the supplied closure.
    ///
    /// Skips everything when the in-flight set is already full, and
    /// skips any term another task is fetching. The closure is expected
    /// to store its results; this method only gates and logs.
    pub async fn prefetch_related<F, Fut>(&self, terms: &[RelatedTerm], fetch: F)
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        {
            let in_flight = self.in_flight.lock().await;
            if in_flight.len() >= self.max_in_flight {
                debug!("prefetch set full, skipping {} related terms", terms.len());
                return;
            }
        }

        for related in terms {
            {
                let mut in_flight = self.in_flight.lock().await;
                if !in_flight.insert(related.term.clone()) {
                    continue;
                }
            }

            match fetch(related.term.clone()).await {
                Ok(()) => debug!("prefetched results for {:?}", related.term),
                Err(e) => warn!("Failed to prefetch {:?}: {e}", related.term),
            }

            self.in_flight.lock().await.remove(&related.term);
        }
    }

    /// Current admission state.
    pub async fn status(&self) -> PrefetchStatus {
        let in_flight = self.in_flight.lock().await;
        PrefetchStatus {
            in_flight: in_flight.len(),
            capacity: self.max_in_flight,
            is_full: in_flight.len() >= self.max_in_flight,
        }
    }

    /// Forgets every in-flight term.
    ///
    /// Running fetches are not cancelled; their completion removals
    /// become no-ops.
    pub async fn clear(&self) {
        self.in_flight.lock().await.clear();
    }
}
