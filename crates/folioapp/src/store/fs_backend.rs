use super::backend::StorageBackend;
use super::RecordStore;
use crate::error::{FolioError, Result};
use crate::model::{FolderRecord, ItemRecord, Scope, TreeDocument};
use fslock::LockFile;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const TREES_FILE: &str = "trees.json";
const FOLDERS_FILE: &str = "folders.json";
const ITEMS_FILE: &str = "items.json";
const LOCK_FILE: &str = ".lock";

/// Filesystem backend: one directory per scope, one JSON file per collection.
///
/// ```text
/// <root>/
/// ├── local/
/// │   ├── .lock
/// │   ├── trees.json
/// │   ├── folders.json
/// │   └── items.json
/// └── global/
///     └── ...
/// ```
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scope_dir(&self, scope: Scope) -> PathBuf {
        self.root.join(scope.as_str())
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(FolioError::Io)?;
        }
        Ok(())
    }

    fn load_collection<T: DeserializeOwned>(&self, scope: Scope, file: &str) -> Result<Vec<T>> {
        let path = self.scope_dir(scope).join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(FolioError::Io)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(FolioError::Serialization)
    }

    fn save_collection<T: Serialize>(&self, scope: Scope, file: &str, records: &[T]) -> Result<()> {
        let dir = self.scope_dir(scope);
        self.ensure_dir(&dir)?;

        let content = serde_json::to_string_pretty(records).map_err(FolioError::Serialization)?;

        // Atomic write
        let tmp_path = dir.join(format!(".{}-{}.tmp", file, Uuid::new_v4()));
        fs::write(&tmp_path, content).map_err(FolioError::Io)?;
        fs::rename(&tmp_path, dir.join(file)).map_err(FolioError::Io)?;

        Ok(())
    }
}

impl StorageBackend for FsBackend {
    type Guard = LockFile;

    /// An OS-level exclusive lock on `<scope>/.lock`. Collections hold every
    /// owner's records, so two processes writing the same scope must not
    /// interleave their load and save.
    fn lock_scope(&self, scope: Scope) -> Result<LockFile> {
        let dir = self.scope_dir(scope);
        self.ensure_dir(&dir)?;
        let path = dir.join(LOCK_FILE);
        let mut lock = LockFile::open(path.as_path())
            .map_err(|e| FolioError::Store(format!("cannot open {}: {}", path.display(), e)))?;
        lock.lock()
            .map_err(|e| FolioError::Store(format!("cannot lock {}: {}", path.display(), e)))?;
        Ok(lock)
    }

    fn load_trees(&self, scope: Scope) -> Result<Vec<TreeDocument>> {
        self.load_collection(scope, TREES_FILE)
    }

    fn save_trees(&self, scope: Scope, trees: &[TreeDocument]) -> Result<()> {
        self.save_collection(scope, TREES_FILE, trees)
    }

    fn load_folders(&self, scope: Scope) -> Result<Vec<FolderRecord>> {
        self.load_collection(scope, FOLDERS_FILE)
    }

    fn save_folders(&self, scope: Scope, folders: &[FolderRecord]) -> Result<()> {
        self.save_collection(scope, FOLDERS_FILE, folders)
    }

    fn load_items(&self, scope: Scope) -> Result<Vec<ItemRecord>> {
        self.load_collection(scope, ITEMS_FILE)
    }

    fn save_items(&self, scope: Scope, items: &[ItemRecord]) -> Result<()> {
        self.save_collection(scope, ITEMS_FILE, items)
    }
}

/// The production store: JSON collections under a data directory.
pub type FileStore = RecordStore<FsBackend>;

impl FileStore {
    pub fn open(root: PathBuf) -> Self {
        RecordStore::with_backend(FsBackend::new(root))
    }
}
