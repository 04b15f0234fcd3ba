//! Static record snapshot for instant suggestions.
//!
//! A snapshot of the character and weapon catalogs ships inside the
//! binary, so the first keystroke can be answered without waiting for
//! the document store. [`StaticCache`] owns the loaded snapshot behind
//! a read-write lock: initialization happens once, loads never throw,
//! and a failed load simply leaves the cache unavailable so callers
//! fall through to the remote store.
//!
//! Snapshot files configured through [`PathsConfig`] override the
//! bundled records, which keeps the binary useful between releases
//! when the catalog grows.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::PathsConfig;
use crate::normalize::{self, RawCharacter, RawWeapon};
use crate::rank::filter_and_rank;
use crate::text::normalize_query;
use crate::types::Suggestion;
use crate::{Error, Result};

const BUNDLED_CHARACTERS: &str = include_str!("../assets/characters.json");
const BUNDLED_WEAPONS: &str = include_str!("../assets/weapons.json");

/// Summary of a loaded snapshot, for diagnostics output.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotInfo {
    /// Character suggestions available.
    pub characters: usize,
    /// Weapon suggestions available.
    pub weapons: usize,
    /// SHA-256 digest of the snapshot source text, base64 encoded.
    pub digest: String,
    /// Whether the snapshot came from override files rather than the
    /// bundled records.
    pub from_files: bool,
}

#[derive(Debug)]
struct Snapshot {
    characters: Vec<Suggestion>,
    weapons: Vec<Suggestion>,
    digest: String,
    from_files: bool,
}

/// Lazily initialized static suggestion source.
///
/// All methods take `&self`; the snapshot sits behind an async
/// read-write lock so concurrent lookups share read access.
#[derive(Debug, Default)]
pub struct StaticCache {
    inner: RwLock<Option<Snapshot>>,
}

impl StaticCache {
    /// Creates an empty, uninitialized cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the snapshot if it has not been loaded yet.
    ///
    /// Returns whether the cache is available afterwards. A load
    /// failure logs a warning and returns `false` without poisoning
    /// anything; a later call may retry. Once loaded, further calls
    /// are no-ops even if they name different override files.
    pub async fn initialize(&self, paths: &PathsConfig) -> bool {
        {
            let inner = self.inner.read().await;
            if inner.is_some() {
                debug!("static snapshot already initialized");
                return true;
            }
        }

        let mut inner = self.inner.write().await;
        // Lost the race to another initializer
        if inner.is_some() {
            return true;
        }

        match load_snapshot(paths) {
            Ok(snapshot) => {
                info!(
                    "Static snapshot initialized: {} characters, {} weapons",
                    snapshot.characters.len(),
                    snapshot.weapons.len()
                );
                *inner = Some(snapshot);
                true
            },
            Err(e) => {
                warn!("Failed to load static snapshot, store fallback will serve: {e}");
                false
            },
        }
    }

    /// Whether a snapshot is loaded.
    pub async fn is_available(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Instant suggestions for a query, ranked and truncated.
    ///
    /// Returns an empty list when the cache is unavailable or the query
    /// is blank.
    pub async fn instant_suggestions(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        let folded = normalize_query(query);
        if folded.is_empty() {
            return Vec::new();
        }

        let inner = self.inner.read().await;
        let Some(snapshot) = inner.as_ref() else {
            return Vec::new();
        };

        let candidates = snapshot
            .characters
            .iter()
            .chain(snapshot.weapons.iter())
            .cloned();
        filter_and_rank(candidates, &folded, limit)
    }

    /// Every suggestion in the snapshot, characters first.
    ///
    /// Empty when the cache is unavailable.
    pub async fn all_suggestions(&self) -> Vec<Suggestion> {
        let inner = self.inner.read().await;
        inner.as_ref().map_or_else(Vec::new, |snapshot| {
            snapshot
                .characters
                .iter()
                .chain(snapshot.weapons.iter())
                .cloned()
                .collect()
        })
    }

    /// Snapshot summary, or `None` when nothing is loaded.
    pub async fn info(&self) -> Option<SnapshotInfo> {
        let inner = self.inner.read().await;
        inner.as_ref().map(|snapshot| SnapshotInfo {
            characters: snapshot.characters.len(),
            weapons: snapshot.weapons.len(),
            digest: snapshot.digest.clone(),
            from_files: snapshot.from_files,
        })
    }
}

fn load_snapshot(paths: &PathsConfig) -> Result<Snapshot> {
    let (characters_json, weapons_json, from_files) = match (
        paths.characters_snapshot.as_deref(),
        paths.weapons_snapshot.as_deref(),
    ) {
        (Some(characters_path), Some(weapons_path)) => (
            read_snapshot_file(characters_path)?,
            read_snapshot_file(weapons_path)?,
            true,
        ),
        (None, None) => (
            BUNDLED_CHARACTERS.to_string(),
            BUNDLED_WEAPONS.to_string(),
            false,
        ),
        _ => {
            return Err(Error::Snapshot(
                "snapshot override needs both characters and weapons files".into(),
            ));
        },
    };

    let raw_characters: Vec<RawCharacter> = serde_json::from_str(&characters_json)?;
    let raw_weapons: Vec<RawWeapon> = serde_json::from_str(&weapons_json)?;

    let characters = normalize::normalize_characters(raw_characters);
    characters.log_issues();
    let weapons = normalize::normalize_weapons(raw_weapons);
    weapons.log_issues();

    let mut hasher = Sha256::new();
    hasher.update(characters_json.as_bytes());
    hasher.update(weapons_json.as_bytes());
    let digest = STANDARD.encode(hasher.finalize());

    Ok(Snapshot {
        characters: characters.suggestions,
        weapons: weapons.suggestions,
        digest,
        from_files,
    })
}

fn read_snapshot_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::Snapshot(format!("cannot read {}: {e}", path.display())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::types::SuggestionKind;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn bundled_paths() -> PathsConfig {
        PathsConfig {
            data_dir: PathBuf::from("/tmp/gachadex-tests"),
            characters_snapshot: None,
            weapons_snapshot: None,
        }
    }

    #[tokio::test]
    async fn test_initialize_loads_bundled_snapshot() {
        let cache = StaticCache::new();
        assert!(!cache.is_available().await);

        let available = cache.initialize(&bundled_paths()).await;

        assert!(available);
        assert!(cache.is_available().await);

        let info = cache.info().await.unwrap();
        assert_eq!(info.characters, 18);
        assert_eq!(info.weapons, 10);
        assert!(!info.from_files);
        // Base64-encoded SHA-256 is always 44 characters
        assert_eq!(info.digest.len(), 44);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let cache = StaticCache::new();

        assert!(cache.initialize(&bundled_paths()).await);
        let first = cache.info().await.unwrap();

        // A second call must not reload, even with different paths
        let temp_dir = TempDir::new().unwrap();
        let other = PathsConfig {
            data_dir: temp_dir.path().to_path_buf(),
            characters_snapshot: Some(temp_dir.path().join("missing.json")),
            weapons_snapshot: Some(temp_dir.path().join("missing.json")),
        };
        assert!(cache.initialize(&other).await);

        let second = cache.info().await.unwrap();
        assert_eq!(first.digest, second.digest);
    }

    #[tokio::test]
    async fn test_uninitialized_cache_serves_nothing() {
        let cache = StaticCache::new();

        assert!(cache.instant_suggestions("hilda", 10).await.is_empty());
        assert!(cache.all_suggestions().await.is_empty());
        assert!(cache.info().await.is_none());
    }

    #[tokio::test]
    async fn test_blank_query_yields_empty() {
        let cache = StaticCache::new();
        cache.initialize(&bundled_paths()).await;

        assert!(cache.instant_suggestions("", 10).await.is_empty());
        assert!(cache.instant_suggestions("   ", 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_exact_name_lookup() {
        let cache = StaticCache::new();
        cache.initialize(&bundled_paths()).await;

        let results = cache.instant_suggestions("hilda", 10).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name.en, "Hilda");
        assert_eq!(results[0].kind, SuggestionKind::Character);
        assert_eq!(results[0].subtitle, "Support • Sound • Sword");
    }

    #[tokio::test]
    async fn test_single_character_match_carries_role() {
        // "zephyr" matches exactly one record, and its subtitle names a role
        let cache = StaticCache::new();
        cache.initialize(&bundled_paths()).await;

        let results = cache.instant_suggestions("zephyr", 10).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, SuggestionKind::Character);
        assert!(results[0].subtitle.contains("Vanguard"));
    }

    #[tokio::test]
    async fn test_unmatched_query_yields_empty() {
        let cache = StaticCache::new();
        cache.initialize(&bundled_paths()).await;

        assert!(cache.instant_suggestions("qqqq", 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_vietnamese_name_lookup() {
        let cache = StaticCache::new();
        cache.initialize(&bundled_paths()).await;

        let results = cache.instant_suggestions("lưỡi kiếm", 10).await;

        // Three swords carry the "Lưỡi Kiếm" prefix in Vietnamese
        let names: Vec<&str> = results.iter().map(|s| s.name.en.as_str()).collect();
        assert_eq!(
            names,
            vec!["Judgement Edge", "Maid's Blade", "Trickster's Blade"]
        );
        assert!(results.iter().all(|s| s.kind == SuggestionKind::Weapon));
    }

    #[tokio::test]
    async fn test_subtitle_lookup_spans_both_kinds() {
        let cache = StaticCache::new();
        cache.initialize(&bundled_paths()).await;

        let results = cache.instant_suggestions("staff", 20).await;

        // Staff wielders plus staff-type weapons
        assert!(results.iter().any(|s| s.kind == SuggestionKind::Character));
        assert!(results.iter().any(|s| s.kind == SuggestionKind::Weapon));
        assert!(
            results
                .iter()
                .all(|s| s.name.en.to_lowercase().contains("staff")
                    || s.subtitle.to_lowercase().contains("staff"))
        );
    }

    #[tokio::test]
    async fn test_limit_bounds_results() {
        let cache = StaticCache::new();
        cache.initialize(&bundled_paths()).await;

        let results = cache.instant_suggestions("s", 3).await;

        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_subtitles_never_leak_placeholder_text() {
        let cache = StaticCache::new();
        cache.initialize(&bundled_paths()).await;

        for suggestion in cache.all_suggestions().await {
            assert!(!suggestion.subtitle.contains("undefined"));
            assert!(!suggestion.subtitle.contains("null"));
            assert!(!suggestion.subtitle.starts_with(" •"));
            assert!(!suggestion.subtitle.ends_with("• "));
        }
    }

    #[tokio::test]
    async fn test_image_falls_back_to_splash() {
        let cache = StaticCache::new();
        cache.initialize(&bundled_paths()).await;

        let results = cache.instant_suggestions("yuming", 10).await;

        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].image.as_deref(),
            Some("/characters/yuming-splash.png")
        );
    }

    #[tokio::test]
    async fn test_snapshot_override_files() {
        let temp_dir = TempDir::new().unwrap();
        let characters_path = temp_dir.path().join("characters.json");
        let weapons_path = temp_dir.path().join("weapons.json");
        fs::write(
            &characters_path,
            r#"[{"_id": "character-testa", "name": {"en": "Testa", "vi": "Testa"},
                 "slug": {"current": "testa"}, "role": "Support"}]"#,
        )
        .unwrap();
        fs::write(&weapons_path, "[]").unwrap();

        let cache = StaticCache::new();
        let available = cache
            .initialize(&PathsConfig {
                data_dir: temp_dir.path().to_path_buf(),
                characters_snapshot: Some(characters_path),
                weapons_snapshot: Some(weapons_path),
            })
            .await;

        assert!(available);
        let info = cache.info().await.unwrap();
        assert_eq!(info.characters, 1);
        assert_eq!(info.weapons, 0);
        assert!(info.from_files);
    }

    #[tokio::test]
    async fn test_corrupt_override_file_leaves_cache_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let characters_path = temp_dir.path().join("characters.json");
        let weapons_path = temp_dir.path().join("weapons.json");
        fs::write(&characters_path, "not json").unwrap();
        fs::write(&weapons_path, "[]").unwrap();

        let cache = StaticCache::new();
        let available = cache
            .initialize(&PathsConfig {
                data_dir: temp_dir.path().to_path_buf(),
                characters_snapshot: Some(characters_path),
                weapons_snapshot: Some(weapons_path),
            })
            .await;

        assert!(!available);
        assert!(!cache.is_available().await);
        assert!(cache.instant_suggestions("testa", 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_override_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let characters_path = temp_dir.path().join("characters.json");
        fs::write(&characters_path, "[]").unwrap();

        let cache = StaticCache::new();
        let available = cache
            .initialize(&PathsConfig {
                data_dir: temp_dir.path().to_path_buf(),
                characters_snapshot: Some(characters_path),
                weapons_snapshot: None,
            })
            .await;

        assert!(!available);
    }
}
