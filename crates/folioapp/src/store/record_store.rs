use super::backend::StorageBackend;
use super::{DataStore, DoctorReport, RecordQuery};
use crate::error::{FolioError, Result};
use crate::model::{
    FolderNode, FolderRecord, ItemRecord, Record, RecordPatch, Scope, TreeDocument,
};
use crate::owner::OwnerFilter;

/// Document-store semantics on top of a raw [`StorageBackend`].
///
/// Each call loads the collection it needs, works on it in memory, and saves it
/// back whole. Backends guarantee each save is atomic, and every write holds the
/// scope lock from load to save.
pub struct RecordStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
}

impl<B: StorageBackend> RecordStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }
}

fn select<R: Record>(records: &[R], owner: &OwnerFilter, query: &RecordQuery) -> Vec<R> {
    records
        .iter()
        .filter(|r| owner.matches(r.owner()) && query.matches(*r))
        .cloned()
        .collect()
}

/// Patches the first owned record with `id` in place, rewriting its stored
/// owner to the canonical form. Returns the updated copy.
///
/// The owner is canonicalized from what is stored, not from the caller's
/// spelling: "042" matches a legacy `42` but must not replace it.
fn patch_one<R: Record>(
    records: &mut [R],
    owner: &OwnerFilter,
    id: &str,
    patch: &RecordPatch,
) -> Option<R> {
    let record = records
        .iter_mut()
        .find(|r| r.id() == id && owner.matches(r.owner()))?;
    record.apply(patch);
    let canonical = record.owner().canonical();
    *record.owner_mut() = canonical;
    Some(record.clone())
}

fn remove_matching<R: Record>(
    records: &mut Vec<R>,
    owner: &OwnerFilter,
    query: &RecordQuery,
) -> usize {
    let before = records.len();
    records.retain(|r| !(owner.matches(r.owner()) && query.matches(r)));
    before - records.len()
}

fn canonicalize<R: Record>(records: &mut [R]) -> usize {
    let mut fixed = 0;
    for record in records.iter_mut().filter(|r| !r.owner().is_canonical()) {
        let canonical = record.owner().canonical();
        *record.owner_mut() = canonical;
        fixed += 1;
    }
    fixed
}

impl<B: StorageBackend> DataStore for RecordStore<B> {
    fn find_tree(&self, scope: Scope, owner: &OwnerFilter) -> Result<Option<TreeDocument>> {
        let trees = self.backend.load_trees(scope)?;
        Ok(trees.into_iter().find(|doc| owner.matches(&doc.owner_id)))
    }

    fn write_tree(
        &mut self,
        scope: Scope,
        owner: &OwnerFilter,
        root: &FolderNode,
        expected_version: Option<u64>,
    ) -> Result<TreeDocument> {
        let _lock = self.backend.lock_scope(scope)?;
        let mut trees = self.backend.load_trees(scope)?;
        let position = trees.iter().position(|doc| owner.matches(&doc.owner_id));
        let current = position.map(|idx| trees[idx].version);

        if current != expected_version {
            return Err(FolioError::Conflict(format!(
                "tree for {} is at version {}, expected {}",
                owner.owner(),
                current.map_or_else(|| "none".to_string(), |v| v.to_string()),
                expected_version.map_or_else(|| "none".to_string(), |v| v.to_string()),
            )));
        }

        let owner_id = match position {
            Some(idx) => trees[idx].owner_id.canonical(),
            None => owner.canonical(),
        };
        let doc = TreeDocument {
            owner_id,
            root: root.clone(),
            version: current.map_or(1, |v| v + 1),
        };
        match position {
            Some(idx) => trees[idx] = doc.clone(),
            None => trees.push(doc.clone()),
        }
        self.backend.save_trees(scope, &trees)?;
        Ok(doc)
    }

    fn insert_folder(&mut self, scope: Scope, record: FolderRecord) -> Result<FolderRecord> {
        let _lock = self.backend.lock_scope(scope)?;
        let mut folders = self.backend.load_folders(scope)?;
        folders.push(record.clone());
        self.backend.save_folders(scope, &folders)?;
        Ok(record)
    }

    fn find_folders(
        &self,
        scope: Scope,
        owner: &OwnerFilter,
        query: &RecordQuery,
    ) -> Result<Vec<FolderRecord>> {
        let folders = self.backend.load_folders(scope)?;
        Ok(select(&folders, owner, query))
    }

    fn update_folder(
        &mut self,
        scope: Scope,
        owner: &OwnerFilter,
        id: &str,
        patch: &RecordPatch,
    ) -> Result<Option<FolderRecord>> {
        let _lock = self.backend.lock_scope(scope)?;
        let mut folders = self.backend.load_folders(scope)?;
        let updated = patch_one(&mut folders, owner, id, patch);
        if updated.is_some() {
            self.backend.save_folders(scope, &folders)?;
        }
        Ok(updated)
    }

    fn delete_folders(
        &mut self,
        scope: Scope,
        owner: &OwnerFilter,
        query: &RecordQuery,
    ) -> Result<usize> {
        let _lock = self.backend.lock_scope(scope)?;
        let mut folders = self.backend.load_folders(scope)?;
        let removed = remove_matching(&mut folders, owner, query);
        if removed > 0 {
            self.backend.save_folders(scope, &folders)?;
        }
        Ok(removed)
    }

    fn upsert_item(
        &mut self,
        scope: Scope,
        owner: &OwnerFilter,
        record: ItemRecord,
    ) -> Result<ItemRecord> {
        let _lock = self.backend.lock_scope(scope)?;
        let mut items = self.backend.load_items(scope)?;
        let existing = items
            .iter_mut()
            .find(|r| r.id == record.id && owner.matches(&r.owner_id));

        let stored = match existing {
            Some(current) => {
                *current = ItemRecord {
                    owner_id: current.owner_id.canonical(),
                    created_at: current.created_at,
                    starred: current.starred,
                    trashed_at: current.trashed_at,
                    ..record
                };
                current.clone()
            }
            None => {
                let fresh = ItemRecord {
                    owner_id: owner.canonical(),
                    ..record
                };
                items.push(fresh.clone());
                fresh
            }
        };

        self.backend.save_items(scope, &items)?;
        Ok(stored)
    }

    fn find_items(
        &self,
        scope: Scope,
        owner: &OwnerFilter,
        query: &RecordQuery,
    ) -> Result<Vec<ItemRecord>> {
        let items = self.backend.load_items(scope)?;
        Ok(select(&items, owner, query))
    }

    fn update_item(
        &mut self,
        scope: Scope,
        owner: &OwnerFilter,
        id: &str,
        patch: &RecordPatch,
    ) -> Result<Option<ItemRecord>> {
        let _lock = self.backend.lock_scope(scope)?;
        let mut items = self.backend.load_items(scope)?;
        let updated = patch_one(&mut items, owner, id, patch);
        if updated.is_some() {
            self.backend.save_items(scope, &items)?;
        }
        Ok(updated)
    }

    fn delete_items(
        &mut self,
        scope: Scope,
        owner: &OwnerFilter,
        query: &RecordQuery,
    ) -> Result<usize> {
        let _lock = self.backend.lock_scope(scope)?;
        let mut items = self.backend.load_items(scope)?;
        let removed = remove_matching(&mut items, owner, query);
        if removed > 0 {
            self.backend.save_items(scope, &items)?;
        }
        Ok(removed)
    }

    fn doctor(&mut self, scope: Scope) -> Result<DoctorReport> {
        let _lock = self.backend.lock_scope(scope)?;
        let mut report = DoctorReport::default();

        let mut trees = self.backend.load_trees(scope)?;
        for doc in trees.iter_mut().filter(|d| !d.owner_id.is_canonical()) {
            doc.owner_id = doc.owner_id.canonical();
            report.fixed_tree_owners += 1;
        }
        if report.fixed_tree_owners > 0 {
            self.backend.save_trees(scope, &trees)?;
        }

        let mut folders = self.backend.load_folders(scope)?;
        report.fixed_folder_owners = canonicalize(&mut folders);
        if report.fixed_folder_owners > 0 {
            self.backend.save_folders(scope, &folders)?;
        }

        let mut items = self.backend.load_items(scope)?;
        report.fixed_item_owners = canonicalize(&mut items);
        if report.fixed_item_owners > 0 {
            self.backend.save_items(scope, &items)?;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Author, ItemKind, ROOT_ID};
    use crate::owner::OwnerValue;
    use crate::store::mem_backend::MemBackend;
    use chrono::{DateTime, Duration, Utc};

    fn make_store() -> RecordStore<MemBackend> {
        RecordStore::with_backend(MemBackend::new())
    }

    fn ts() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    fn folder(owner: OwnerValue, id: &str, parent: &str) -> FolderRecord {
        FolderRecord {
            owner_id: owner,
            id: id.into(),
            name: id.to_uppercase(),
            parent_id: parent.into(),
            scope: Scope::Local,
            author: Author::default(),
            starred: false,
            trashed_at: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn item(owner: &str, id: &str, folder_id: &str, content: &str) -> ItemRecord {
        ItemRecord {
            owner_id: OwnerValue::from(owner),
            id: id.into(),
            folder_id: folder_id.into(),
            kind: ItemKind::Text,
            name: None,
            url: None,
            file_name: None,
            content: Some(content.into()),
            scope: Scope::Local,
            author: Author::default(),
            starred: false,
            trashed_at: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    // --- Tree documents ---

    #[test]
    fn test_write_tree_creates_then_bumps_version() {
        let mut store = make_store();
        let owner = OwnerFilter::new("u1");
        let root = FolderNode::root(ts());

        assert!(store.find_tree(Scope::Local, &owner).unwrap().is_none());

        let first = store.write_tree(Scope::Local, &owner, &root, None).unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(first.owner_id, OwnerValue::from("u1"));

        let second = store
            .write_tree(Scope::Local, &owner, &root, Some(1))
            .unwrap();
        assert_eq!(second.version, 2);
        assert_eq!(store.backend.load_trees(Scope::Local).unwrap().len(), 1);
    }

    #[test]
    fn test_write_tree_rejects_stale_version() {
        let mut store = make_store();
        let owner = OwnerFilter::new("u1");
        let root = FolderNode::root(ts());
        store.write_tree(Scope::Local, &owner, &root, None).unwrap();
        store
            .write_tree(Scope::Local, &owner, &root, Some(1))
            .unwrap();

        let stale = store.write_tree(Scope::Local, &owner, &root, Some(1));
        assert!(matches!(stale, Err(FolioError::Conflict(_))));

        // A second "first write" is stale too
        let blind = store.write_tree(Scope::Local, &owner, &root, None);
        assert!(matches!(blind, Err(FolioError::Conflict(_))));
    }

    #[test]
    fn test_tree_lookup_matches_legacy_numeric_owner() {
        let store = make_store();
        store
            .backend
            .save_trees(
                Scope::Local,
                &[TreeDocument {
                    owner_id: OwnerValue::Number(42.0),
                    root: FolderNode::root(ts()),
                    version: 3,
                }],
            )
            .unwrap();

        let doc = store
            .find_tree(Scope::Local, &OwnerFilter::new("42"))
            .unwrap()
            .unwrap();
        assert_eq!(doc.version, 3);
        assert!(store
            .find_tree(Scope::Local, &OwnerFilter::new("43"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_tree_write_canonicalizes_owner() {
        let mut store = make_store();
        store
            .backend
            .save_trees(
                Scope::Local,
                &[TreeDocument {
                    owner_id: OwnerValue::Number(42.0),
                    root: FolderNode::root(ts()),
                    version: 1,
                }],
            )
            .unwrap();

        let owner = OwnerFilter::new("42");
        let doc = store
            .write_tree(Scope::Local, &owner, &FolderNode::root(ts()), Some(1))
            .unwrap();
        assert_eq!(doc.owner_id, OwnerValue::from("42"));
    }

    #[test]
    fn test_tree_write_keeps_numeric_owner_reachable() {
        let mut store = make_store();
        store
            .backend
            .save_trees(
                Scope::Local,
                &[TreeDocument {
                    owner_id: OwnerValue::Number(42.0),
                    root: FolderNode::root(ts()),
                    version: 3,
                }],
            )
            .unwrap();

        // "042" parses to the same number, so it matches the legacy document
        let alias = OwnerFilter::new("042");
        let doc = store
            .write_tree(Scope::Local, &alias, &FolderNode::root(ts()), Some(3))
            .unwrap();
        assert_eq!(doc.owner_id, OwnerValue::from("42"));

        let found = store
            .find_tree(Scope::Local, &OwnerFilter::new("42"))
            .unwrap()
            .unwrap();
        assert_eq!(found.version, 4);
    }

    #[test]
    fn test_scopes_are_isolated() {
        let mut store = make_store();
        let owner = OwnerFilter::new("u1");
        store
            .write_tree(Scope::Global, &owner, &FolderNode::root(ts()), None)
            .unwrap();
        assert!(store.find_tree(Scope::Local, &owner).unwrap().is_none());
    }

    // --- Folders ---

    #[test]
    fn test_folders_are_owner_scoped() {
        let mut store = make_store();
        store
            .insert_folder(Scope::Local, folder("a".into(), "f1", ROOT_ID))
            .unwrap();
        store
            .insert_folder(Scope::Local, folder("b".into(), "f2", ROOT_ID))
            .unwrap();

        let mine = store
            .find_folders(Scope::Local, &OwnerFilter::new("a"), &RecordQuery::all())
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "f1");

        // Another owner cannot patch it
        let patched = store
            .update_folder(
                Scope::Local,
                &OwnerFilter::new("b"),
                "f1",
                &RecordPatch::rename("Stolen", ts()),
            )
            .unwrap();
        assert!(patched.is_none());
    }

    #[test]
    fn test_update_folder_applies_patch_and_canonicalizes() {
        let mut store = make_store();
        store
            .insert_folder(Scope::Local, folder(OwnerValue::Number(7.0), "f1", ROOT_ID))
            .unwrap();

        let later = ts() + Duration::minutes(5);
        let updated = store
            .update_folder(
                Scope::Local,
                &OwnerFilter::new("7"),
                "f1",
                &RecordPatch::trash(later),
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.trashed_at, Some(later));
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.owner_id, OwnerValue::from("7"));
    }

    #[test]
    fn test_update_through_numeric_alias_keeps_owner() {
        let mut store = make_store();
        store
            .insert_folder(Scope::Local, folder(OwnerValue::Number(42.0), "f1", ROOT_ID))
            .unwrap();

        let updated = store
            .update_folder(
                Scope::Local,
                &OwnerFilter::new("42.0"),
                "f1",
                &RecordPatch::trash(ts()),
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.owner_id, OwnerValue::from("42"));

        let visible = store
            .find_folders(Scope::Local, &OwnerFilter::new("42"), &RecordQuery::all())
            .unwrap();
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn test_delete_folders_by_query() {
        let mut store = make_store();
        for (id, parent) in [("a", ROOT_ID), ("b", "a"), ("c", ROOT_ID)] {
            store
                .insert_folder(Scope::Local, folder("o".into(), id, parent))
                .unwrap();
        }
        let owner = OwnerFilter::new("o");
        let removed = store
            .delete_folders(Scope::Local, &owner, &RecordQuery::by_ids(["a", "b"]))
            .unwrap();
        assert_eq!(removed, 2);

        let left = store
            .find_folders(Scope::Local, &owner, &RecordQuery::all())
            .unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, "c");
    }

    // --- Items ---

    #[test]
    fn test_upsert_item_keeps_lifecycle_fields() {
        let mut store = make_store();
        let owner = OwnerFilter::new("o");
        store
            .upsert_item(Scope::Local, &owner, item("o", "i1", ROOT_ID, "v1"))
            .unwrap();
        store
            .update_item(Scope::Local, &owner, "i1", &RecordPatch::star(true, ts()))
            .unwrap();

        let mut next = item("o", "i1", "f9", "v2");
        next.created_at = ts() + Duration::days(1);
        let stored = store.upsert_item(Scope::Local, &owner, next).unwrap();

        assert_eq!(stored.content.as_deref(), Some("v2"));
        assert_eq!(stored.folder_id, "f9");
        assert_eq!(stored.created_at, ts());
        assert!(stored.starred);

        let all = store
            .find_items(Scope::Local, &owner, &RecordQuery::all())
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_upsert_item_through_numeric_alias_keeps_owner() {
        let mut store = make_store();
        let mut legacy = item("x", "i1", ROOT_ID, "v1");
        legacy.owner_id = OwnerValue::Number(7.0);
        store.backend.save_items(Scope::Local, &[legacy]).unwrap();

        let stored = store
            .upsert_item(Scope::Local, &OwnerFilter::new("7e0"), item("7e0", "i1", ROOT_ID, "v2"))
            .unwrap();
        assert_eq!(stored.owner_id, OwnerValue::from("7"));

        let mine = store
            .find_items(Scope::Local, &OwnerFilter::new("7"), &RecordQuery::all())
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].content.as_deref(), Some("v2"));
    }

    #[test]
    fn test_delete_items_in_folders() {
        let mut store = make_store();
        let owner = OwnerFilter::new("o");
        for (id, folder_id) in [("i1", "f1"), ("i2", "f2"), ("i3", ROOT_ID)] {
            store
                .upsert_item(Scope::Local, &owner, item("o", id, folder_id, "x"))
                .unwrap();
        }
        let removed = store
            .delete_items(Scope::Local, &owner, &RecordQuery::children_of(["f1", "f2"]))
            .unwrap();
        assert_eq!(removed, 2);
    }

    #[test]
    fn test_write_error_surfaces() {
        let mut store = make_store();
        store.backend.set_simulate_write_error(true);
        let result = store.insert_folder(Scope::Local, folder("o".into(), "f1", ROOT_ID));
        assert!(matches!(result, Err(FolioError::Store(_))));
    }

    // --- Doctor ---

    #[test]
    fn test_doctor_rewrites_numeric_owners() {
        let mut store = make_store();
        store
            .insert_folder(Scope::Local, folder(OwnerValue::Number(42.0), "f1", ROOT_ID))
            .unwrap();
        store
            .insert_folder(Scope::Local, folder("42".into(), "f2", ROOT_ID))
            .unwrap();

        let report = store.doctor(Scope::Local).unwrap();
        assert_eq!(report.fixed_folder_owners, 1);
        assert_eq!(report.total(), 1);

        let folders = store.backend.load_folders(Scope::Local).unwrap();
        assert!(folders.iter().all(|f| f.owner_id.is_canonical()));

        // Idempotent
        assert_eq!(store.doctor(Scope::Local).unwrap().total(), 0);
    }
}
