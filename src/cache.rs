//! Render-through asset cache with single-flight misses
//!
//! A stored file is served verbatim. On a miss the asset is rendered, written
//! to the store and returned. Concurrent misses for one key wait on the same
//! render instead of each producing their own.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::store::{FileStore, StoreError};

type Flight = Arc<OnceCell<Vec<u8>>>;

/// File store fronted by an in-flight render table.
#[derive(Debug)]
pub struct AssetCache {
    store: FileStore,
    in_flight: Mutex<HashMap<String, Flight>>,
}

impl AssetCache {
    pub fn new(store: FileStore) -> Self {
        Self { store, in_flight: Mutex::new(HashMap::new()) }
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Number of renders currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Return the stored bytes for `key`, rendering and storing them first if
    /// nothing is stored yet.
    ///
    /// `render` runs at most once per key among concurrent callers. A failed
    /// render writes nothing, so the next request tries again.
    pub async fn get_or_render<F, Fut, E>(&self, key: &str, render: F) -> Result<Vec<u8>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, E>>,
        E: From<StoreError>,
    {
        if let Some(bytes) = self.store.read(key).await? {
            debug!(key, "Cache hit");
            return Ok(bytes);
        }

        let flight = self.join(key);
        let result = flight
            .get_or_try_init(|| async {
                // Another flight may have finished between the first check and joining
                if let Some(bytes) = self.store.read(key).await? {
                    return Ok(bytes);
                }
                info!(key, "Cache miss, rendering");
                let bytes = render().await?;
                self.store.write(key, &bytes).await?;
                Ok::<_, E>(bytes)
            })
            .await
            .cloned();
        self.leave(key, &flight);
        result
    }

    fn join(&self, key: &str) -> Flight {
        let mut in_flight = self.in_flight.lock();
        Arc::clone(in_flight.entry(key.to_string()).or_default())
    }

    fn leave(&self, key: &str, flight: &Flight) {
        let mut in_flight = self.in_flight.lock();
        if in_flight.get(key).is_some_and(|current| Arc::ptr_eq(current, flight)) {
            in_flight.remove(key);
        }
    }
}
