//! Persistent scene geometry cache.
//!
//! Records are keyed by scene name (last write wins). Backends implement the
//! small asynchronous [`SceneStore`] surface; the most recently displayed
//! scene name lives in a separate synchronous [`ScalarSlot`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use scene::SceneData;
use serde::{Deserialize, Serialize};

pub mod cache;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_store;
#[cfg(target_arch = "wasm32")]
mod wasm_storage;

pub use cache::*;
#[cfg(not(target_arch = "wasm32"))]
pub use file_store::{FileScalarSlot, FileSceneStore};
#[cfg(target_arch = "wasm32")]
pub use wasm_storage::{IndexedDbSceneStore, LocalStorageSlot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub name: String,
    /// Milliseconds since the Unix epoch at write time.
    pub timestamp: u64,
    pub payload: SceneData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    NotFound,
    StorageUnavailable,
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::NotFound => write!(f, "scene not found in cache"),
            CatalogError::StorageUnavailable => write!(f, "persistent storage unavailable"),
            CatalogError::Corrupt(msg) => write!(f, "cache storage corrupt: {msg}"),
            CatalogError::Io(msg) => write!(f, "cache storage error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Asynchronous keyed table of [`CacheRecord`]s.
///
/// `open` must be idempotent; [`MapCache`] calls it before first use.
#[allow(async_fn_in_trait)]
pub trait SceneStore {
    async fn open(&self) -> Result<(), CatalogError>;
    async fn put(&self, record: &CacheRecord) -> Result<(), CatalogError>;
    async fn get(&self, name: &str) -> Result<Option<CacheRecord>, CatalogError>;
    async fn clear(&self) -> Result<(), CatalogError>;
    async fn names(&self) -> Result<Vec<String>, CatalogError>;
}

/// A single persisted string value.
pub trait ScalarSlot {
    fn load(&self) -> Result<Option<String>, CatalogError>;
    fn store(&self, value: &str) -> Result<(), CatalogError>;
}

/// Records are kept serialized so a round trip exercises the same encoding
/// the persistent backends use.
#[derive(Debug, Default)]
pub struct InMemorySceneStore {
    records: RefCell<BTreeMap<String, String>>,
    opens: Cell<usize>,
}

impl InMemorySceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_count(&self) -> usize {
        self.opens.get()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl SceneStore for InMemorySceneStore {
    async fn open(&self) -> Result<(), CatalogError> {
        self.opens.set(self.opens.get() + 1);
        Ok(())
    }

    async fn put(&self, record: &CacheRecord) -> Result<(), CatalogError> {
        let raw = serde_json::to_string(record).map_err(|e| CatalogError::Io(e.to_string()))?;
        self.records.borrow_mut().insert(record.name.clone(), raw);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<CacheRecord>, CatalogError> {
        let records = self.records.borrow();
        let Some(raw) = records.get(name) else {
            return Ok(None);
        };
        serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| CatalogError::Corrupt(e.to_string()))
    }

    async fn clear(&self) -> Result<(), CatalogError> {
        self.records.borrow_mut().clear();
        Ok(())
    }

    async fn names(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.records.borrow().keys().cloned().collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemorySlot {
    value: RefCell<Option<String>>,
}

impl InMemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScalarSlot for InMemorySlot {
    fn load(&self) -> Result<Option<String>, CatalogError> {
        Ok(self.value.borrow().clone())
    }

    fn store(&self, value: &str) -> Result<(), CatalogError> {
        *self.value.borrow_mut() = Some(value.to_string());
        Ok(())
    }
}
