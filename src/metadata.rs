//! Item metadata table and essence table
//!
//! The item table is an immutable snapshot behind a lock that is only held
//! long enough to clone or swap an `Arc`. A refresh builds a whole new map,
//! persists it and swaps it in, so readers see either the old table or the
//! new one.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::fetch::{FetchError, MetadataSource};
use crate::models::{build_table, SkyblockAsset};

/// Item id → asset mapping, keys upper-cased.
pub type ItemTable = BTreeMap<String, SkyblockAsset>;

/// Error loading, refreshing or persisting metadata
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The remote source failed
    #[error("Failed to fetch item metadata: {0}")]
    Fetch(#[from] FetchError),
    /// A snapshot or mapping file could not be read or written
    #[error("Metadata IO error on {path}: {source}")]
    Io { path: String, source: std::io::Error },
    /// A snapshot or mapping file holds invalid JSON
    #[error("Invalid metadata in {path}: {source}")]
    Parse { path: String, source: serde_json::Error },
}

/// The live item metadata table.
#[derive(Debug, Default)]
pub struct ItemMetadataTable {
    table: RwLock<Arc<ItemTable>>,
    snapshot_path: Option<PathBuf>,
}

impl ItemMetadataTable {
    /// An empty table that persists refreshes to `snapshot_path`.
    pub fn new(snapshot_path: Option<PathBuf>) -> Self {
        Self { table: RwLock::new(Arc::new(ItemTable::new())), snapshot_path }
    }

    /// A table seeded with `table` and no snapshot file.
    pub fn from_table(table: ItemTable) -> Self {
        Self { table: RwLock::new(Arc::new(table)), snapshot_path: None }
    }

    /// Look up an item; ids are matched case-insensitively.
    pub fn get(&self, id: &str) -> Option<SkyblockAsset> {
        self.table.read().get(&id.to_uppercase()).cloned()
    }

    /// All known item ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.table.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// The current table.
    pub fn snapshot(&self) -> Arc<ItemTable> {
        Arc::clone(&self.table.read())
    }

    /// Replace the whole table.
    pub fn replace(&self, table: ItemTable) {
        *self.table.write() = Arc::new(table);
    }

    /// Seed the table from the snapshot file, if it exists.
    ///
    /// A missing or unreadable snapshot leaves the table empty and is logged;
    /// it is never fatal. Returns the number of items loaded.
    pub fn load_snapshot(&self) -> usize {
        let Some(path) = self.snapshot_path.as_deref() else {
            return 0;
        };
        if !path.exists() {
            info!(path = %path.display(), "No item snapshot yet, starting empty");
            return 0;
        }
        match read_json::<ItemTable>(path) {
            Ok(table) => {
                let count = table.len();
                let table = table.into_iter().map(|(k, v)| (k.to_uppercase(), v)).collect();
                self.replace(table);
                info!(path = %path.display(), items = count, "Loaded item snapshot");
                count
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable item snapshot");
                0
            }
        }
    }

    /// Fetch fresh metadata, persist it and swap it in.
    ///
    /// On any failure the current table is left untouched.
    #[instrument(skip_all)]
    pub async fn refresh(&self, source: &dyn MetadataSource) -> Result<usize, MetadataError> {
        info!("Refreshing item metadata");
        let items = source.fetch_items().await?;
        let table = build_table(&items);
        let count = table.len();

        if let Some(path) = self.snapshot_path.clone() {
            let json = serde_json::to_vec_pretty(&table).map_err(|source| MetadataError::Parse {
                path: path.display().to_string(),
                source,
            })?;
            write_snapshot(path, json).await?;
        }

        self.replace(table);
        info!(items = count, "Finished refreshing item metadata");
        Ok(count)
    }
}

async fn write_snapshot(path: PathBuf, json: Vec<u8>) -> Result<(), MetadataError> {
    let io_err = |path: &Path, source| MetadataError::Io { path: path.display().to_string(), source };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&dir).await.map_err(|e| io_err(&dir, e))?;

    tokio::task::spawn_blocking(move || {
        use std::io::Write;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| io_err(&dir, e))?;
        tmp.write_all(&json).map_err(|e| io_err(&path, e))?;
        tmp.persist(&path).map_err(|e| io_err(&path, e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| MetadataError::Io { path: "snapshot".to_string(), source: std::io::Error::other(e) })?
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, MetadataError> {
    let contents = std::fs::read(path)
        .map_err(|source| MetadataError::Io { path: path.display().to_string(), source })?;
    serde_json::from_slice(&contents)
        .map_err(|source| MetadataError::Parse { path: path.display().to_string(), source })
}

/// Essence id → skin texture id, loaded once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EssenceTable {
    entries: BTreeMap<String, String>,
}

impl EssenceTable {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries: entries.into_iter().map(|(k, v)| (k.to_uppercase(), v)).collect() }
    }

    /// Load the mapping from a JSON object file.
    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        Ok(Self::new(read_json(path)?))
    }

    /// Texture id of an essence; ids are matched case-insensitively.
    pub fn texture(&self, id: &str) -> Option<&str> {
        self.entries.get(&id.to_uppercase()).map(String::as_str)
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
