//! # Storage Layer
//!
//! This module defines the storage abstraction for folio. The [`DataStore`] trait
//! is the document-store surface the commands talk to; it knows nothing about
//! folders-as-trees or trash semantics, only about owner-matched records.
//!
//! ## Collections
//!
//! Each [`Scope`] holds three independent collections:
//!
//! 1. **trees**: one [`TreeDocument`] per owner (Tree Model).
//! 2. **folders**: [`FolderRecord`]s (Adjacency Model).
//! 3. **items**: [`ItemRecord`]s (Adjacency Model).
//!
//! ## Owner Matching
//!
//! Every read and write is keyed by an [`OwnerFilter`], so legacy records whose
//! owner was stored as a number are found by the string form too. Records are
//! always written back with the canonical string owner.
//!
//! ## Concurrency
//!
//! Tree documents carry a version. [`DataStore::write_tree`] takes the version
//! the caller read and refuses the write with a conflict if someone else wrote
//! in between. Adjacency writes are single-record set-style updates and need no
//! such check.
//!
//! ## Implementations
//!
//! - [`RecordStore`] over [`fs_backend::FsBackend`]: production, JSON files on disk.
//! - [`memory::InMemoryStore`]: for testing logic without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! <data-dir>/
//! ├── local/
//! │   ├── trees.json
//! │   ├── folders.json
//! │   └── items.json
//! └── global/
//!     └── ...
//! ```

use crate::error::Result;
use crate::model::{
    FolderNode, FolderRecord, ItemRecord, Record, RecordPatch, Scope, TreeDocument,
};
use crate::owner::OwnerFilter;
use std::collections::BTreeSet;

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;
pub mod record_store;

pub use record_store::RecordStore;

/// Which side of the trash a query selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrashFilter {
    #[default]
    Any,
    Live,
    Trashed,
}

/// Selection over adjacency records of one owner.
///
/// `None` sets mean "no constraint". All given constraints must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    pub ids: Option<BTreeSet<String>>,
    pub parents: Option<BTreeSet<String>>,
    pub trash: TrashFilter,
}

impl RecordQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: &str) -> Self {
        Self::by_ids([id])
    }

    pub fn by_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Some(ids.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Records whose parent (folder parent or item folder) is one of `parents`.
    pub fn children_of<I, S>(parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parents: Some(parents.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn live(mut self) -> Self {
        self.trash = TrashFilter::Live;
        self
    }

    pub fn trashed(mut self) -> Self {
        self.trash = TrashFilter::Trashed;
        self
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        if let Some(ids) = &self.ids {
            if !ids.contains(record.id()) {
                return false;
            }
        }
        if let Some(parents) = &self.parents {
            if !parents.contains(record.parent()) {
                return false;
            }
        }
        match self.trash {
            TrashFilter::Any => true,
            TrashFilter::Live => !record.is_trashed(),
            TrashFilter::Trashed => record.is_trashed(),
        }
    }
}

/// Report from the `doctor` operation.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorReport {
    pub fixed_tree_owners: usize,
    pub fixed_folder_owners: usize,
    pub fixed_item_owners: usize,
}

impl DoctorReport {
    pub fn total(&self) -> usize {
        self.fixed_tree_owners + self.fixed_folder_owners + self.fixed_item_owners
    }
}

/// Abstract interface for namespace storage.
///
/// Implementations must handle persistence, owner matching, and the tree
/// version check for records within a given scope.
pub trait DataStore {
    // --- Tree Model ---

    /// The owner's tree document, if one was ever written.
    fn find_tree(&self, scope: Scope, owner: &OwnerFilter) -> Result<Option<TreeDocument>>;

    /// Upserts the owner's tree.
    ///
    /// `expected_version` is the version the caller read (`None` when no
    /// document existed). Returns the stored document with its new version,
    /// or a conflict when the stored version moved on.
    fn write_tree(
        &mut self,
        scope: Scope,
        owner: &OwnerFilter,
        root: &FolderNode,
        expected_version: Option<u64>,
    ) -> Result<TreeDocument>;

    // --- Adjacency Model: folders ---

    fn insert_folder(&mut self, scope: Scope, record: FolderRecord) -> Result<FolderRecord>;

    fn find_folders(
        &self,
        scope: Scope,
        owner: &OwnerFilter,
        query: &RecordQuery,
    ) -> Result<Vec<FolderRecord>>;

    /// Applies `patch` to one folder. `None` when no such folder exists.
    fn update_folder(
        &mut self,
        scope: Scope,
        owner: &OwnerFilter,
        id: &str,
        patch: &RecordPatch,
    ) -> Result<Option<FolderRecord>>;

    /// Deletes the matching folders, returning how many were removed.
    fn delete_folders(
        &mut self,
        scope: Scope,
        owner: &OwnerFilter,
        query: &RecordQuery,
    ) -> Result<usize>;

    // --- Adjacency Model: items ---

    /// Inserts the item, or replaces the content fields of an existing item with
    /// the same id. `created_at`, `starred`, and `trashed_at` of an existing item
    /// are kept.
    fn upsert_item(
        &mut self,
        scope: Scope,
        owner: &OwnerFilter,
        record: ItemRecord,
    ) -> Result<ItemRecord>;

    fn find_items(
        &self,
        scope: Scope,
        owner: &OwnerFilter,
        query: &RecordQuery,
    ) -> Result<Vec<ItemRecord>>;

    fn update_item(
        &mut self,
        scope: Scope,
        owner: &OwnerFilter,
        id: &str,
        patch: &RecordPatch,
    ) -> Result<Option<ItemRecord>>;

    fn delete_items(
        &mut self,
        scope: Scope,
        owner: &OwnerFilter,
        query: &RecordQuery,
    ) -> Result<usize>;

    // --- Maintenance ---

    /// Rewrites legacy numeric owner ids into their canonical string form.
    fn doctor(&mut self, scope: Scope) -> Result<DoctorReport>;
}
