use super::backend::StorageBackend;
use crate::error::{FolioError, Result};
use crate::model::{FolderRecord, ItemRecord, Scope, TreeDocument};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since the engine is single-threaded
/// per request. This avoids the overhead of `RwLock` while still allowing the
/// `StorageBackend` trait to use `&self` for all methods.
#[derive(Default)]
pub struct MemBackend {
    trees: RefCell<HashMap<Scope, Vec<TreeDocument>>>,
    folders: RefCell<HashMap<Scope, Vec<FolderRecord>>>,
    items: RefCell<HashMap<Scope, Vec<ItemRecord>>>,
    simulate_write_error: Cell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(FolioError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    // `&mut RecordStore` already makes writes exclusive
    type Guard = ();

    fn lock_scope(&self, _scope: Scope) -> Result<()> {
        Ok(())
    }

    fn load_trees(&self, scope: Scope) -> Result<Vec<TreeDocument>> {
        Ok(self.trees.borrow().get(&scope).cloned().unwrap_or_default())
    }

    fn save_trees(&self, scope: Scope, trees: &[TreeDocument]) -> Result<()> {
        self.check_writable()?;
        self.trees.borrow_mut().insert(scope, trees.to_vec());
        Ok(())
    }

    fn load_folders(&self, scope: Scope) -> Result<Vec<FolderRecord>> {
        Ok(self.folders.borrow().get(&scope).cloned().unwrap_or_default())
    }

    fn save_folders(&self, scope: Scope, folders: &[FolderRecord]) -> Result<()> {
        self.check_writable()?;
        self.folders.borrow_mut().insert(scope, folders.to_vec());
        Ok(())
    }

    fn load_items(&self, scope: Scope) -> Result<Vec<ItemRecord>> {
        Ok(self.items.borrow().get(&scope).cloned().unwrap_or_default())
    }

    fn save_items(&self, scope: Scope, items: &[ItemRecord]) -> Result<()> {
        self.check_writable()?;
        self.items.borrow_mut().insert(scope, items.to_vec());
        Ok(())
    }
}
