use crate::error::Result;
use crate::model::{FolderRecord, ItemRecord, Scope, TreeDocument};

/// Abstract interface for raw collection I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while RecordStore handles the "what" (owner matching, queries, versioning).
///
/// Each scope owns three independent collections. Loads of a collection that
/// was never written return an empty list.
pub trait StorageBackend {
    /// Held for the whole load-modify-save of one write; released on drop.
    type Guard;

    /// Blocks until this handle holds the scope's write lock. Other handles,
    /// in this process or another, wait for the guard to drop.
    fn lock_scope(&self, scope: Scope) -> Result<Self::Guard>;

    // --- Tree Model ---

    /// Load every owner's tree document (trees.json)
    fn load_trees(&self, scope: Scope) -> Result<Vec<TreeDocument>>;

    /// Replace the tree documents collection.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn save_trees(&self, scope: Scope, trees: &[TreeDocument]) -> Result<()>;

    // --- Adjacency Model ---

    /// Load all folder records (folders.json)
    fn load_folders(&self, scope: Scope) -> Result<Vec<FolderRecord>>;

    /// Replace the folder records collection.
    fn save_folders(&self, scope: Scope, folders: &[FolderRecord]) -> Result<()>;

    /// Load all item records (items.json)
    fn load_items(&self, scope: Scope) -> Result<Vec<ItemRecord>>;

    /// Replace the item records collection.
    fn save_items(&self, scope: Scope, items: &[ItemRecord]) -> Result<()>;
}
