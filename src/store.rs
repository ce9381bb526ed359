//! Flat file store of rendered assets, one `{key}.png` file per asset
//!
//! A file's existence is authoritative: whatever is on disk is served as-is.
//! Writes go through a temporary file in the same directory and are renamed
//! into place, so readers never observe a partial file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

/// Suffix of in-progress writes.
const TEMP_SUFFIX: &str = ".png.tmp";
/// Temporary files older than this are left over from an interrupted write.
const STALE_TEMP_AGE: Duration = Duration::from_secs(10 * 60);

/// Error reading or writing the store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key would escape the store directory or is empty
    #[error("Invalid store key '{0}'")]
    InvalidKey(String),
    /// Filesystem failure
    #[error("Store IO error on {path}: {source}")]
    Io { path: String, source: std::io::Error },
    /// The blocking write task was cancelled or panicked
    #[error("Store write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io { path: path.display().to_string(), source }
    }
}

/// Directory-backed asset store.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() || key.contains(|c: char| c == '/' || c == '\\') || key.contains("..") {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.png", key)))
    }

    /// Read a stored asset; `None` when nothing is stored under `key`.
    pub async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    /// Atomically store `bytes` under `key`, replacing any previous file.
    pub async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).await.map_err(|e| StoreError::io(&self.dir, e))?;

        let dir = self.dir.clone();
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, &bytes)).await?
    }

    /// Remove every stored `*.png` file, returning how many were removed.
    ///
    /// Stale temporary files from interrupted writes are swept too but not
    /// counted. Other files in the directory are left alone. A missing
    /// directory is an empty store.
    pub async fn clear(&self) -> Result<usize, StoreError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await.map_err(|e| StoreError::io(&self.dir, e))? {
            let path = entry.path();
            if is_temp_file(&path) {
                if is_stale(&entry).await {
                    sweep_temp(&path).await;
                }
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("png") {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => {
                    info!(path = %path.display(), "Removed stored asset");
                    removed += 1;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove stored asset"),
            }
        }
        Ok(removed)
    }
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with(TEMP_SUFFIX))
}

/// Files whose age can't be read count as stale.
async fn is_stale(entry: &fs::DirEntry) -> bool {
    let Ok(modified) = entry.metadata().await.and_then(|m| m.modified()) else {
        return true;
    };
    SystemTime::now().duration_since(modified).map(|age| age >= STALE_TEMP_AGE).unwrap_or(false)
}

async fn sweep_temp(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => info!(path = %path.display(), "Removed stale temporary file"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove temporary file"),
    }
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".")
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| StoreError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}
