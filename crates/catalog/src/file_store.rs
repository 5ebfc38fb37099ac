//! Directory-backed store for native hosts and tooling.
//!
//! Layout: one `<encoded name>.json` per record under `scenes/`, plus a
//! `last_scene` text file for the scalar slot.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{CacheRecord, CatalogError, ScalarSlot, SceneStore};

const SCENES_DIR: &str = "scenes";
const LAST_SCENE_FILE: &str = "last_scene";

/// Keeps file names portable: ASCII alphanumerics, `-` and `_` pass through,
/// every other byte is written as `%XX`.
fn encode_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for b in name.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

fn io_err(context: &str, path: &Path, e: std::io::Error) -> CatalogError {
    CatalogError::Io(format!("{context} {path:?}: {e}"))
}

#[derive(Debug, Clone)]
pub struct FileSceneStore {
    root: PathBuf,
}

impl FileSceneStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn scenes_dir(&self) -> PathBuf {
        self.root.join(SCENES_DIR)
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.scenes_dir().join(format!("{}.json", encode_name(name)))
    }

    fn record_paths(&self) -> Result<Vec<PathBuf>, CatalogError> {
        self.files_matching(|file| file.ends_with(".json"))
    }

    fn files_matching(&self, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>, CatalogError> {
        let dir = self.scenes_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err("read_dir", &dir, e)),
        };
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| io_err("read_dir", &dir, e))?.path();
            if path.file_name().and_then(|s| s.to_str()).is_some_and(&keep) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn read_record(path: &Path) -> Result<CacheRecord, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|e| io_err("read", path, e))?;
        serde_json::from_str(&raw).map_err(|e| CatalogError::Corrupt(format!("{path:?}: {e}")))
    }
}

impl SceneStore for FileSceneStore {
    async fn open(&self) -> Result<(), CatalogError> {
        let dir = self.scenes_dir();
        fs::create_dir_all(&dir).map_err(|e| io_err("create", &dir, e))
    }

    async fn put(&self, record: &CacheRecord) -> Result<(), CatalogError> {
        let path = self.record_path(&record.name);
        let raw = serde_json::to_string(record).map_err(|e| CatalogError::Io(e.to_string()))?;
        // Write-then-rename so a crash never leaves a truncated record behind.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|e| io_err("write", &tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_err("rename", &path, e))
    }

    async fn get(&self, name: &str) -> Result<Option<CacheRecord>, CatalogError> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_record(&path).map(Some)
    }

    /// Removes every record, including temporaries left by an interrupted `put`.
    async fn clear(&self) -> Result<(), CatalogError> {
        let doomed = self.files_matching(|file| file.ends_with(".json") || file.ends_with(".json.tmp"))?;
        for path in doomed {
            fs::remove_file(&path).map_err(|e| io_err("remove", &path, e))?;
        }
        Ok(())
    }

    async fn names(&self) -> Result<Vec<String>, CatalogError> {
        let mut names = Vec::new();
        for path in self.record_paths()? {
            names.push(Self::read_record(&path)?.name);
        }
        names.sort();
        Ok(names)
    }
}

#[derive(Debug, Clone)]
pub struct FileScalarSlot {
    path: PathBuf,
}

impl FileScalarSlot {
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        Self {
            path: root.as_ref().join(LAST_SCENE_FILE),
        }
    }
}

impl ScalarSlot for FileScalarSlot {
    fn load(&self) -> Result<Option<String>, CatalogError> {
        match fs::read_to_string(&self.path) {
            Ok(s) => Ok(Some(s.trim().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err("read", &self.path, e)),
        }
    }

    fn store(&self, value: &str) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err("create", parent, e))?;
        }
        fs::write(&self.path, value).map_err(|e| io_err("write", &self.path, e))
    }
}
