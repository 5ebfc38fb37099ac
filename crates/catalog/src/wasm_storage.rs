//! Browser backends: IndexedDB for scene records, LocalStorage for the
//! last-scene slot.

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::{CacheRecord, CatalogError, ScalarSlot, SceneStore};

// The open promise is memoized per database name, so repeated opens share one
// connection.
#[wasm_bindgen(inline_js = "
const __sandbox_idb = new Map();

function __sandbox_open(db_name, store_name) {
    const key = db_name + '/' + store_name;
    if (__sandbox_idb.has(key)) return __sandbox_idb.get(key);

    const p = new Promise((resolve, reject) => {
        try {
            const req = indexedDB.open(db_name, 1);
            req.onupgradeneeded = () => {
                const db = req.result;
                if (!db.objectStoreNames.contains(store_name)) {
                    db.createObjectStore(store_name, { keyPath: 'name' });
                }
            };
            req.onsuccess = () => resolve(req.result);
            req.onerror = () => reject(req.error || new Error('IndexedDB open failed'));
        } catch (e) {
            reject(e);
        }
    });
    p.catch(() => __sandbox_idb.delete(key));
    __sandbox_idb.set(key, p);
    return p;
}

function __sandbox_tx(db_name, store_name, mode, body) {
    return __sandbox_open(db_name, store_name).then((db) => new Promise((resolve, reject) => {
        try {
            const tx = db.transaction([store_name], mode);
            const out = body(tx.objectStore(store_name));
            tx.oncomplete = () => resolve(out.result === undefined ? null : out.result);
            tx.onerror = () => reject(tx.error || new Error('IndexedDB transaction failed'));
            tx.onabort = () => reject(tx.error || new Error('IndexedDB transaction aborted'));
        } catch (e) {
            reject(e);
        }
    }));
}

export function sandbox_idb_open(db_name, store_name) {
    return __sandbox_open(db_name, store_name).then(() => true);
}

export function sandbox_idb_put(db_name, store_name, json) {
    return __sandbox_tx(db_name, store_name, 'readwrite', (s) => s.put(JSON.parse(json)));
}

export function sandbox_idb_get(db_name, store_name, name) {
    return __sandbox_tx(db_name, store_name, 'readonly', (s) => s.get(name))
        .then((v) => (v === null || v === undefined) ? null : JSON.stringify(v));
}

export function sandbox_idb_clear(db_name, store_name) {
    return __sandbox_tx(db_name, store_name, 'readwrite', (s) => s.clear());
}

export function sandbox_idb_names(db_name, store_name) {
    return __sandbox_tx(db_name, store_name, 'readonly', (s) => s.getAllKeys())
        .then((keys) => JSON.stringify(keys || []));
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn sandbox_idb_open(db_name: &str, store_name: &str) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch)]
    fn sandbox_idb_put(db_name: &str, store_name: &str, json: &str)
    -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch)]
    fn sandbox_idb_get(db_name: &str, store_name: &str, name: &str)
    -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch)]
    fn sandbox_idb_clear(db_name: &str, store_name: &str) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch)]
    fn sandbox_idb_names(db_name: &str, store_name: &str) -> Result<js_sys::Promise, JsValue>;
}

fn js_err(op: &str, e: JsValue) -> CatalogError {
    CatalogError::Io(format!("{op} failed: {e:?}"))
}

#[derive(Debug, Clone)]
pub struct IndexedDbSceneStore {
    db_name: String,
    store_name: String,
}

impl IndexedDbSceneStore {
    pub fn new(db_name: impl Into<String>, store_name: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
            store_name: store_name.into(),
        }
    }

    async fn run(&self, op: &str, promise: Result<js_sys::Promise, JsValue>) -> Result<JsValue, CatalogError> {
        let promise = promise.map_err(|e| js_err(op, e))?;
        JsFuture::from(promise).await.map_err(|e| js_err(op, e))
    }
}

impl SceneStore for IndexedDbSceneStore {
    async fn open(&self) -> Result<(), CatalogError> {
        self.run("open", sandbox_idb_open(&self.db_name, &self.store_name))
            .await
            .map(|_| ())
    }

    async fn put(&self, record: &CacheRecord) -> Result<(), CatalogError> {
        let json = serde_json::to_string(record).map_err(|e| CatalogError::Io(e.to_string()))?;
        self.run("put", sandbox_idb_put(&self.db_name, &self.store_name, &json))
            .await
            .map(|_| ())
    }

    async fn get(&self, name: &str) -> Result<Option<CacheRecord>, CatalogError> {
        let v = self
            .run("get", sandbox_idb_get(&self.db_name, &self.store_name, name))
            .await?;
        let Some(raw) = v.as_string() else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CatalogError::Corrupt(e.to_string()))
    }

    async fn clear(&self) -> Result<(), CatalogError> {
        self.run("clear", sandbox_idb_clear(&self.db_name, &self.store_name))
            .await
            .map(|_| ())
    }

    async fn names(&self) -> Result<Vec<String>, CatalogError> {
        let v = self
            .run("names", sandbox_idb_names(&self.db_name, &self.store_name))
            .await?;
        let raw = v.as_string().unwrap_or_else(|| "[]".to_string());
        serde_json::from_str(&raw).map_err(|e| CatalogError::Corrupt(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorageSlot {
    key: String,
}

impl LocalStorageSlot {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl ScalarSlot for LocalStorageSlot {
    fn load(&self) -> Result<Option<String>, CatalogError> {
        window_local_storage()?
            .get_item(&self.key)
            .map_err(|e| CatalogError::Io(format!("get_item failed: {e:?}")))
    }

    fn store(&self, value: &str) -> Result<(), CatalogError> {
        window_local_storage()?
            .set_item(&self.key, value)
            .map_err(|e| CatalogError::Io(format!("set_item failed: {e:?}")))
    }
}

fn window_local_storage() -> Result<web_sys::Storage, CatalogError> {
    let win = web_sys::window().ok_or(CatalogError::StorageUnavailable)?;
    win.local_storage()
        .map_err(|e| CatalogError::Io(format!("localStorage error: {e:?}")))?
        .ok_or(CatalogError::StorageUnavailable)
}
