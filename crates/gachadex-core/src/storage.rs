//! Persistence for analytics event snapshots.
//!
//! Two JSON slots under the data directory hold the tails of the
//! search and abandonment buffers. The slots are a warm-start hint, not
//! a durable log: writes are atomic per slot (temp file then rename),
//! but there is no cross-process locking, so concurrent writers follow
//! last-write-wins. A missing slot reads as empty; a corrupt slot is an
//! error the caller downgrades to a warning.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::PathsConfig;
use crate::types::{AbandonmentEvent, SearchEvent};
use crate::{Error, Result};

const SEARCH_EVENTS_FILE: &str = "search_events.json";
const ABANDONMENTS_FILE: &str = "abandonments.json";

/// File-backed storage for analytics snapshots.
#[derive(Debug, Clone)]
pub struct AnalyticsStore {
    data_dir: PathBuf,
}

impl AnalyticsStore {
    /// Creates storage rooted at the configured data directory.
    pub fn new(paths: &PathsConfig) -> Result<Self> {
        Self::with_dir(paths.data_dir.clone())
    }

    /// Creates storage rooted at an explicit directory.
    pub fn with_dir(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir)
            .map_err(|e| Error::Storage(format!("Failed to create data directory: {e}")))?;
        Ok(Self { data_dir })
    }

    /// Directory holding the snapshot slots.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the search event slot.
    #[must_use]
    pub fn search_events_path(&self) -> PathBuf {
        self.data_dir.join(SEARCH_EVENTS_FILE)
    }

    /// Path of the abandonment event slot.
    #[must_use]
    pub fn abandonments_path(&self) -> PathBuf {
        self.data_dir.join(ABANDONMENTS_FILE)
    }

    /// Writes the search event tail, replacing the previous snapshot.
    pub fn save_search_events(&self, events: &[SearchEvent]) -> Result<()> {
        self.write_slot(&self.search_events_path(), events)?;
        debug!("Saved {} search events", events.len());
        Ok(())
    }

    /// Reads the persisted search events; a missing slot is empty.
    pub fn load_search_events(&self) -> Result<Vec<SearchEvent>> {
        self.read_slot(&self.search_events_path())
    }

    /// Writes the abandonment event tail, replacing the previous snapshot.
    pub fn save_abandonments(&self, events: &[AbandonmentEvent]) -> Result<()> {
        self.write_slot(&self.abandonments_path(), events)?;
        debug!("Saved {} abandonment events", events.len());
        Ok(())
    }

    /// Reads the persisted abandonment events; a missing slot is empty.
    pub fn load_abandonments(&self) -> Result<Vec<AbandonmentEvent>> {
        self.read_slot(&self.abandonments_path())
    }

    /// Removes both slots. Missing files are fine.
    pub fn clear(&self) -> Result<()> {
        for path in [self.search_events_path(), self.abandonments_path()] {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    Error::Storage(format!("Failed to remove {}: {e}", path.display()))
                })?;
            }
        }
        Ok(())
    }

    fn write_slot<T: serde::Serialize>(&self, path: &Path, events: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(events)
            .map_err(|e| Error::Storage(format!("Failed to serialize events: {e}")))?;

        // Write to a temp file first to ensure atomicity
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &json)
            .map_err(|e| Error::Storage(format!("Failed to write temp snapshot: {e}")))?;

        #[cfg(target_os = "windows")]
        if path.exists() {
            fs::remove_file(path)
                .map_err(|e| Error::Storage(format!("Failed to remove existing snapshot: {e}")))?;
        }
        fs::rename(&tmp_path, path)
            .map_err(|e| Error::Storage(format!("Failed to commit snapshot: {e}")))?;

        Ok(())
    }

    fn read_slot<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let json = fs::read_to_string(path)
            .map_err(|e| Error::Storage(format!("Failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&json)
            .map_err(|e| Error::Storage(format!("Failed to parse {}: {e}", path.display())))
    }
}
