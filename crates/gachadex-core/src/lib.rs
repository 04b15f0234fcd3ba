//! # gachadex-core
//!
//! Core functionality for gachadex - search suggestions for a bilingual
//! (English/Vietnamese) database of Duet Night Abyss characters and weapons.
//!
//! The crate answers one question quickly: given a few typed characters,
//! which records should a typeahead show? It layers three tiers to do so
//! without ever failing the caller:
//!
//! - **Static tier**: a bundled record snapshot served from memory for
//!   instant, offline-capable suggestions
//! - **Result cache**: an LRU of recently ranked queries with a longer
//!   lifetime for popular ones
//! - **Store tier**: the remote document store, consulted when the other
//!   tiers miss, with its results ranked and cached on the way out
//!
//! Around the tiers sit an analytics recorder (windowed metrics, popular
//! and related queries, best-effort persistence), a bounded prefetcher
//! that warms the cache for related terms, and a debounced typeahead
//! session with a monotonic staleness guard.
//!
//! ## Quick Start
//!
//! ```rust
//! use gachadex_core::{Config, SuggestService};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> gachadex_core::Result<()> {
//! let mut config = Config::default();
//! # let dir = tempfile::TempDir::new().unwrap();
//! # config.paths.data_dir = dir.path().to_path_buf();
//! let service = SuggestService::new(config)?;
//! service.initialize().await;
//!
//! let suggestions = service.search_suggestions("hilda", 5, true).await;
//! for s in &suggestions {
//!     println!("{} ({})", s.name.en, s.subtitle);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! The suggest path itself never returns an error: snapshot problems,
//! store outages, and persistence failures all degrade to smaller or
//! empty result lists. Fallible setup operations return
//! [`Result<T, Error>`] with structured error information and an
//! [`Error::is_recoverable`] hint.

/// Windowed search metrics, popularity, and related terms
pub mod analytics;
/// Configuration file, defaults, and environment overrides
pub mod config;
/// Error types and result aliases
pub mod error;
/// Raw store records to typed suggestions
pub mod normalize;
/// Bounded speculative warming of the result cache
pub mod prefetch;
/// Query matching and suggestion ordering
pub mod rank;
/// TTL- and LRU-bounded cache of ranked results
pub mod result_cache;
/// The assembled suggestion pipeline
pub mod service;
/// Debounced typeahead sessions with staleness guarding
pub mod session;
/// Bundled record snapshot served from memory
pub mod snapshot;
/// Analytics snapshot persistence on the local filesystem
pub mod storage;
/// HTTP client for the remote document store
pub mod store;
/// Query folding and Unicode normalization helpers
pub mod text;
/// Core data types and structures
pub mod types;

// Re-export commonly used types
pub use analytics::{RelatedTerm, SearchAnalytics, SearchMetrics};
pub use config::{
    AnalyticsConfig, CacheConfig, Config, PathsConfig, PrefetchConfig, SearchConfig, StoreConfig,
};
pub use error::{Error, Result};
pub use normalize::{NormalizedBatch, RecordIssue, normalize_characters, normalize_weapons};
pub use prefetch::{PrefetchStatus, Prefetcher};
pub use rank::{MatchTier, filter_and_rank};
pub use result_cache::ResultCache;
pub use service::{SuggestService, SuggestionSource};
pub use session::{SessionUpdate, TypeaheadSession};
pub use snapshot::{SnapshotInfo, StaticCache};
pub use storage::AnalyticsStore;
pub use store::{CombinedPayload, StoreClient};
pub use text::normalize_query;
pub use types::*;
