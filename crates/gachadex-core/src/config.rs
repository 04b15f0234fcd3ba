//! Configuration for the suggestion pipeline.
//!
//! Configuration is stored in TOML format, loaded from the platform config
//! directory (or an explicit path), and overridable through `GACHADEX_*`
//! environment variables. Every value has a default matching the shipped
//! behavior, so a missing config file is never an error.
//!
//! ## File Location
//!
//! - Linux: `~/.config/gachadex/gachadex.toml`
//! - macOS: `~/Library/Application Support/gg.gachadex.gachadex/gachadex.toml`
//! - Windows: `%APPDATA%\gachadex\gachadex\gachadex.toml`
//!
//! ## Environment Overrides
//!
//! - `GACHADEX_STORE_ENDPOINT` - document store base URL
//! - `GACHADEX_DATASET` - dataset name within the store
//! - `GACHADEX_DATA_DIR` - analytics snapshot directory
//!
//! ## Example Configuration File
//!
//! ```toml
//! [store]
//! endpoint = "https://content.gachadex.gg"
//! dataset = "production"
//!
//! [search]
//! default_limit = 10
//! debounce_ms = 150
//!
//! [cache]
//! default_ttl_secs = 300
//! popular_ttl_secs = 1800
//! capacity = 256
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, types::Language};

/// Default result list bound when the caller does not supply one.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;
/// Default keystroke debounce interval.
pub const DEFAULT_DEBOUNCE_MS: u64 = 150;
/// Per-kind result cap requested from the combined stored query.
pub const DEFAULT_PER_KIND_FETCH_CAP: usize = 8;
/// Result cache lifetime for ordinary entries.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;
/// Result cache lifetime for popular entries.
pub const DEFAULT_POPULAR_TTL_SECS: u64 = 30 * 60;
/// Result cache capacity bound.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;
/// Frequency at which a query term counts as popular.
pub const DEFAULT_POPULAR_THRESHOLD: usize = 3;
/// Concurrent speculative prefetches allowed in flight.
pub const DEFAULT_PREFETCH_CAPACITY: usize = 5;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document store connection settings
    pub store: StoreConfig,
    /// Query surface behavior
    pub search: SearchConfig,
    /// Result cache tuning
    pub cache: CacheConfig,
    /// Analytics recorder tuning
    pub analytics: AnalyticsConfig,
    /// Prefetcher tuning
    pub prefetch: PrefetchConfig,
    /// File system paths
    pub paths: PathsConfig,
}

/// Remote document store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the document store, without a trailing slash.
    pub endpoint: String,

    /// Dataset name within the store.
    pub dataset: String,

    /// Optional request timeout in seconds.
    ///
    /// The interactive suggest path runs without one (a hung store call
    /// leaves that request pending; the caller's staleness guard makes the
    /// next keystroke supersede it). One-shot CLI commands set this so a
    /// hung store cannot wedge a terminal.
    pub request_timeout_secs: Option<u64>,
}

/// Query surface behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result list bound when the caller does not supply one.
    pub default_limit: usize,

    /// Keystroke debounce interval in milliseconds.
    pub debounce_ms: u64,

    /// Per-kind result cap requested from the combined stored query.
    pub per_kind_fetch_cap: usize,

    /// Display language when the caller does not specify one.
    pub default_language: Language,
}

/// Result cache tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of an ordinary entry, in seconds.
    pub default_ttl_secs: u64,

    /// Lifetime of a popular entry, in seconds.
    pub popular_ttl_secs: u64,

    /// Maximum number of cached queries; least recently used entries are
    /// evicted past this bound.
    pub capacity: usize,
}

/// Analytics recorder tuning.
///
/// The buffers are ring-like: capacities bound total retention, windows
/// bound what `metrics()` looks at, and the persist tails bound what is
/// mirrored to disk after each recorded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Search event buffer capacity.
    pub search_capacity: usize,

    /// Abandonment event buffer capacity.
    pub abandonment_capacity: usize,

    /// How many recent search events `metrics()` analyses.
    pub metrics_window: usize,

    /// How many recent abandonment events `metrics()` analyses.
    pub abandonment_window: usize,

    /// Frequency at which a query term counts as popular.
    pub popular_threshold: usize,

    /// Search events mirrored to the persisted snapshot.
    pub persist_search_tail: usize,

    /// Abandonment events mirrored to the persisted snapshot.
    pub persist_abandonment_tail: usize,

    /// Default number of related terms returned.
    pub related_limit: usize,
}

/// Prefetcher tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchConfig {
    /// Concurrent speculative prefetches allowed in flight; further
    /// prefetch work is skipped while the set is full.
    pub max_in_flight: usize,
}

/// File system paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the persisted analytics snapshot slots.
    pub data_dir: PathBuf,

    /// Optional snapshot files overriding the bundled record snapshot.
    pub characters_snapshot: Option<PathBuf>,
    /// Optional snapshot files overriding the bundled record snapshot.
    pub weapons_snapshot: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location or create with defaults.
    ///
    /// A missing file yields the default configuration; a present but
    /// malformed file is an error. Environment overrides are applied after
    /// loading in both cases.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_inner(&config_path)
    }

    /// Load configuration from an explicit path, with env overrides.
    ///
    /// Unlike [`Config::load`], the file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Self::load_inner(path)
    }

    fn load_inner(path: &Path) -> Result<Self> {
        let mut config: Self = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        let parent = config_path
            .parent()
            .ok_or_else(|| Error::Config("Invalid config path".into()))?;

        fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

        fs::write(&config_path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let project_dirs = directories::ProjectDirs::from("gg", "gachadex", "gachadex")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;

        Ok(project_dirs.config_dir().join("gachadex.toml"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("GACHADEX_STORE_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.store.endpoint = endpoint;
            }
        }
        if let Ok(dataset) = std::env::var("GACHADEX_DATASET") {
            if !dataset.trim().is_empty() {
                self.store.dataset = dataset;
            }
        }
        if let Ok(data_dir) = std::env::var("GACHADEX_DATA_DIR") {
            if !data_dir.trim().is_empty() {
                self.paths.data_dir = PathBuf::from(data_dir);
            }
        }
    }

    /// Check configuration invariants.
    ///
    /// Runs automatically on load; the production service constructor
    /// calls it again since nothing guarantees its config came through
    /// [`Config::load`].
    pub fn validate(&self) -> Result<()> {
        let endpoint = url::Url::parse(&self.store.endpoint)
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", self.store.endpoint)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "unsupported scheme '{}' in store endpoint",
                endpoint.scheme()
            )));
        }
        if self.store.dataset.trim().is_empty() {
            return Err(Error::Config("store.dataset must not be empty".into()));
        }
        if self.search.default_limit == 0 {
            return Err(Error::Config("search.default_limit must be > 0".into()));
        }
        if self.search.per_kind_fetch_cap == 0 {
            return Err(Error::Config("search.per_kind_fetch_cap must be > 0".into()));
        }
        if self.cache.capacity == 0 {
            return Err(Error::Config("cache.capacity must be > 0".into()));
        }
        if self.cache.default_ttl_secs == 0 || self.cache.popular_ttl_secs == 0 {
            return Err(Error::Config("cache TTLs must be > 0".into()));
        }
        if self.cache.popular_ttl_secs < self.cache.default_ttl_secs {
            return Err(Error::Config(
                "cache.popular_ttl_secs must be >= cache.default_ttl_secs".into(),
            ));
        }
        if self.analytics.search_capacity == 0 || self.analytics.abandonment_capacity == 0 {
            return Err(Error::Config("analytics capacities must be > 0".into()));
        }
        if self.analytics.metrics_window > self.analytics.search_capacity {
            return Err(Error::Config(
                "analytics.metrics_window must not exceed analytics.search_capacity".into(),
            ));
        }
        if self.analytics.popular_threshold == 0 {
            return Err(Error::Config(
                "analytics.popular_threshold must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Lifetime of an ordinary result cache entry.
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.default_ttl_secs)
    }

    /// Lifetime of a popular result cache entry.
    #[must_use]
    pub const fn popular_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.popular_ttl_secs)
    }

    /// Keystroke debounce interval.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            search: SearchConfig::default(),
            cache: CacheConfig::default(),
            analytics: AnalyticsConfig::default(),
            prefetch: PrefetchConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://content.gachadex.gg".to_string(),
            dataset: "production".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_SUGGESTION_LIMIT,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            per_kind_fetch_cap: DEFAULT_PER_KIND_FETCH_CAP,
            default_language: Language::En,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            popular_ttl_secs: DEFAULT_POPULAR_TTL_SECS,
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            search_capacity: 1000,
            abandonment_capacity: 500,
            metrics_window: 100,
            abandonment_window: 50,
            popular_threshold: DEFAULT_POPULAR_THRESHOLD,
            persist_search_tail: 100,
            persist_abandonment_tail: 50,
            related_limit: 3,
        }
    }
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_PREFETCH_CAPACITY,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: directories::ProjectDirs::from("gg", "gachadex", "gachadex").map_or_else(
                || {
                    directories::BaseDirs::new().map_or_else(
                        || PathBuf::from(".gachadex"),
                        |base| base.home_dir().join(".gachadex"),
                    )
                },
                |dirs| dirs.data_dir().to_path_buf(),
            ),
            characters_snapshot: None,
            weapons_snapshot: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Note: Environment override tests live in the CLI integration suite,
    // which can scope variables per spawned process. set_var/remove_var are
    // unsafe in Rust 2024 edition due to potential data races.

    #[test]
    fn test_default_config_values() {
        // Given: Default configuration is requested
        let config = Config::default();

        // Then: Should carry the shipped defaults
        assert_eq!(config.store.endpoint, "https://content.gachadex.gg");
        assert_eq!(config.store.dataset, "production");
        assert!(config.store.request_timeout_secs.is_none());
        assert_eq!(config.search.default_limit, 10);
        assert_eq!(config.search.debounce_ms, 150);
        assert_eq!(config.search.per_kind_fetch_cap, 8);
        assert_eq!(config.cache.default_ttl_secs, 300);
        assert_eq!(config.cache.popular_ttl_secs, 1800);
        assert_eq!(config.cache.capacity, 256);
        assert_eq!(config.analytics.search_capacity, 1000);
        assert_eq!(config.analytics.abandonment_capacity, 500);
        assert_eq!(config.analytics.metrics_window, 100);
        assert_eq!(config.analytics.abandonment_window, 50);
        assert_eq!(config.analytics.popular_threshold, 3);
        assert_eq!(config.prefetch.max_in_flight, 5);
        assert!(!config.paths.data_dir.as_os_str().is_empty());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        // Given: A temporary directory and a tweaked configuration
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("gachadex.toml");

        let mut original = Config::default();
        original.store.endpoint = "https://staging.gachadex.gg".to_string();
        original.cache.capacity = 64;
        original.search.default_language = Language::Vi;

        // When: Saving and then loading the configuration
        let content = toml::to_string_pretty(&original).unwrap();
        fs::write(&config_path, content).unwrap();
        let loaded = Config::load_from(&config_path).unwrap();

        // Then: Values should survive the round trip
        assert_eq!(loaded.store.endpoint, "https://staging.gachadex.gg");
        assert_eq!(loaded.cache.capacity, 64);
        assert_eq!(loaded.search.default_language, Language::Vi);
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        // Given: A config file specifying only one section
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("gachadex.toml");
        fs::write(
            &config_path,
            "[cache]\ndefault_ttl_secs = 60\npopular_ttl_secs = 600\n",
        )
        .unwrap();

        // When: Loading
        let loaded = Config::load_from(&config_path).unwrap();

        // Then: Specified values apply, the rest fall back to defaults
        assert_eq!(loaded.cache.default_ttl_secs, 60);
        assert_eq!(loaded.cache.popular_ttl_secs, 600);
        assert_eq!(loaded.cache.capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(loaded.search.default_limit, DEFAULT_SUGGESTION_LIMIT);
    }

    #[test]
    fn test_config_load_missing_explicit_path() {
        let result = Config::load_from(Path::new("/definitely/does/not/exist/gachadex.toml"));

        assert!(result.is_err());
        if let Err(Error::Config(msg)) = result {
            assert!(msg.contains("not found"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_config_parse_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        let result = Config::load_from(&config_path);

        assert!(result.is_err());
        if let Err(Error::Config(msg)) = result {
            assert!(msg.contains("Failed to parse config"));
        } else {
            panic!("Expected Config parse error");
        }
    }

    #[test]
    fn test_validation_rejects_bad_endpoint() {
        let mut config = Config::default();
        config.store.endpoint = "not a url".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));

        config.store.endpoint = "ftp://content.gachadex.gg".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_validation_rejects_inverted_ttls() {
        let mut config = Config::default();
        config.cache.default_ttl_secs = 1800;
        config.cache.popular_ttl_secs = 300;

        let result = config.validate();

        assert!(result.is_err());
        if let Err(Error::Config(msg)) = result {
            assert!(msg.contains("popular_ttl_secs"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_validation_rejects_zero_bounds() {
        let mut config = Config::default();
        config.cache.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.default_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analytics.popular_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_window_exceeding_capacity() {
        let mut config = Config::default();
        config.analytics.search_capacity = 50;
        config.analytics.metrics_window = 100;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duration_accessors() {
        let config = Config::default();

        assert_eq!(config.default_ttl(), Duration::from_secs(300));
        assert_eq!(config.popular_ttl(), Duration::from_secs(1800));
        assert_eq!(config.debounce(), Duration::from_millis(150));
    }
}
