use std::cell::Cell;

use foundation::time::now_ms;
use scene::SceneData;
use tracing::{debug, info, warn};

use crate::{CacheRecord, CatalogError, ScalarSlot, SceneStore};

/// Scene geometry cache over a [`SceneStore`] plus the "last displayed scene"
/// slot.
///
/// The store is opened lazily on first use and the result is remembered, so
/// later calls reuse it. A failed open is retried on the next call.
#[derive(Debug)]
pub struct MapCache<S, L> {
    store: S,
    last_scene: L,
    opened: Cell<bool>,
}

impl<S: SceneStore, L: ScalarSlot> MapCache<S, L> {
    pub fn new(store: S, last_scene: L) -> Self {
        Self {
            store,
            last_scene,
            opened: Cell::new(false),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn ensure_open(&self) -> Result<(), CatalogError> {
        if self.opened.get() {
            return Ok(());
        }
        self.store.open().await?;
        self.opened.set(true);
        debug!("scene cache opened");
        Ok(())
    }

    /// Upserts `scene` under its name with the current timestamp.
    pub async fn put(&self, scene: &SceneData) -> Result<(), CatalogError> {
        self.put_record(&CacheRecord {
            name: scene.name.clone(),
            timestamp: now_ms(),
            payload: scene.clone(),
        })
        .await
    }

    pub async fn put_record(&self, record: &CacheRecord) -> Result<(), CatalogError> {
        self.ensure_open().await?;
        self.store.put(record).await?;
        debug!(scene = %record.name, lanes = record.payload.lanes.len(), "scene cached");
        Ok(())
    }

    /// Returns the cached payload or [`CatalogError::NotFound`].
    pub async fn get(&self, name: &str) -> Result<SceneData, CatalogError> {
        self.get_record(name).await.map(|r| r.payload)
    }

    pub async fn get_record(&self, name: &str) -> Result<CacheRecord, CatalogError> {
        self.ensure_open().await?;
        self.store.get(name).await?.ok_or(CatalogError::NotFound)
    }

    pub async fn clear(&self) -> Result<(), CatalogError> {
        self.ensure_open().await?;
        self.store.clear().await?;
        info!("scene cache cleared");
        Ok(())
    }

    pub async fn names(&self) -> Result<Vec<String>, CatalogError> {
        self.ensure_open().await?;
        self.store.names().await
    }

    /// Name of the most recently displayed scene, if one was recorded.
    /// Slot failures are logged and read as "none".
    pub fn last_scene_name(&self) -> Option<String> {
        match self.last_scene.load() {
            Ok(name) => name.filter(|n| !n.trim().is_empty()),
            Err(err) => {
                warn!(error = %err, "could not read last scene name");
                None
            }
        }
    }

    pub fn remember_last_scene(&self, name: &str) {
        if let Err(err) = self.last_scene.store(name) {
            warn!(error = %err, scene = name, "could not persist last scene name");
        }
    }

    /// Loads the last displayed scene, falling back to `fallback` when no name
    /// was recorded.
    pub async fn restore_last(&self, fallback: &str) -> Result<SceneData, CatalogError> {
        let name = self
            .last_scene_name()
            .unwrap_or_else(|| fallback.to_string());
        self.get(&name).await
    }
}
