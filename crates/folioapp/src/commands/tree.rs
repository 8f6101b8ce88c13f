//! Tree Model service.
//!
//! Every mutation follows the same cycle: read the owner's document (or start
//! from a fresh root), apply a pure [`crate::tree`] transform, write it back with
//! the version that was read. A concurrent writer in between turns the write into
//! a [`FolioError::Conflict`] instead of silently losing one side.
//!
//! Reads of a missing document never persist the fresh root.

use super::helpers::{clean_name, new_folder_id, new_item_id};
use crate::error::{FolioError, Result};
use crate::model::{FolderNode, Item, ItemInput, Scope, ROOT_ID};
use crate::owner::OwnerFilter;
use crate::store::DataStore;
use crate::tree;
use crate::view::{item_views, FolderSummary, TreeItemView};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

/// An owner's tree as last read or written.
///
/// `version == 0` means nothing has been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeSnapshot {
    pub root: FolderNode,
    pub version: u64,
}

fn load<S: DataStore>(
    store: &S,
    scope: Scope,
    owner: &OwnerFilter,
) -> Result<(FolderNode, Option<u64>)> {
    Ok(match store.find_tree(scope, owner)? {
        Some(doc) => (doc.root, Some(doc.version)),
        None => (FolderNode::root(Utc::now()), None),
    })
}

fn commit<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    root: &FolderNode,
    read_version: Option<u64>,
) -> Result<TreeSnapshot> {
    let doc = store
        .write_tree(scope, owner, root, read_version)
        .inspect_err(|e| {
            if matches!(e, FolioError::Conflict(_)) {
                warn!(owner = owner.owner(), %scope, "tree write lost a race: {}", e);
            }
        })?;
    Ok(TreeSnapshot {
        root: doc.root,
        version: doc.version,
    })
}

fn folder_not_found(id: &str) -> FolioError {
    warn!(folder_id = id, "tree folder lookup failed");
    FolioError::NotFound("Folder".to_string())
}

pub fn read<S: DataStore>(store: &S, scope: Scope, owner: &OwnerFilter) -> Result<TreeSnapshot> {
    let (root, version) = load(store, scope, owner)?;
    debug!(owner = owner.owner(), %scope, version, "tree read");
    Ok(TreeSnapshot {
        root,
        version: version.unwrap_or(0),
    })
}

/// Appends a new child under `parent_id` and bumps the parent's `updatedAt`.
pub fn create_folder<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    parent_id: &str,
    name: &str,
) -> Result<(TreeSnapshot, FolderSummary)> {
    let name = clean_name(name)?;
    let (root, version) = load(store, scope, owner)?;
    if tree::find(&root, parent_id).is_none() {
        warn!(parent_id, "parent folder not in tree");
        return Err(FolioError::NotFound("Parent folder".to_string()));
    }

    let now = Utc::now();
    let id = new_folder_id(now);
    let child = FolderNode::child(id.clone(), name.clone(), parent_id.to_string(), now);
    let next = tree::update_by_id(&root, parent_id, &|parent| {
        let mut children = parent.children.clone();
        children.push(child.clone());
        FolderNode {
            children,
            updated_at: Some(now),
            ..parent.clone()
        }
    });

    let snapshot = commit(store, scope, owner, &next, version)?;
    info!(owner = owner.owner(), folder_id = %id, "tree folder created");
    Ok((
        snapshot,
        FolderSummary {
            id,
            name,
            parent_id: parent_id.to_string(),
        },
    ))
}

pub fn rename_folder<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    folder_id: &str,
    name: &str,
) -> Result<TreeSnapshot> {
    let name = clean_name(name)?;
    let (root, version) = load(store, scope, owner)?;
    if tree::find(&root, folder_id).is_none() {
        return Err(folder_not_found(folder_id));
    }

    let now = Utc::now();
    let renamed = tree::rename(&root, folder_id, &name);
    let next = tree::update_by_id(&renamed, folder_id, &|node| FolderNode {
        updated_at: Some(now),
        ..node.clone()
    });

    let snapshot = commit(store, scope, owner, &next, version)?;
    info!(owner = owner.owner(), folder_id, "tree folder renamed");
    Ok(snapshot)
}

/// Removes the folder with its whole subtree, then bumps the root's `updatedAt`.
pub fn delete_folder<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    folder_id: &str,
) -> Result<TreeSnapshot> {
    if folder_id == ROOT_ID {
        return Err(FolioError::Validation(
            "The root folder cannot be deleted".to_string(),
        ));
    }
    let (root, version) = load(store, scope, owner)?;
    if tree::find(&root, folder_id).is_none() {
        return Err(folder_not_found(folder_id));
    }

    let now = Utc::now();
    let pruned = tree::delete_subtree(&root, folder_id);
    let next = tree::update_by_id(&pruned, ROOT_ID, &|node| FolderNode {
        updated_at: Some(now),
        ..node.clone()
    });

    let snapshot = commit(store, scope, owner, &next, version)?;
    info!(owner = owner.owner(), folder_id, "tree folder deleted");
    Ok(snapshot)
}

pub fn list_items<S: DataStore>(
    store: &S,
    scope: Scope,
    owner: &OwnerFilter,
    folder_id: &str,
) -> Result<Vec<TreeItemView>> {
    let (root, _) = load(store, scope, owner)?;
    let folder = tree::find(&root, folder_id).ok_or_else(|| folder_not_found(folder_id))?;
    Ok(item_views(folder))
}

/// Writes `input` into the folder's items (replace by id, else append).
///
/// Returns the stored item and the folder's item list after the write.
pub fn upsert_item<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    folder_id: &str,
    input: ItemInput,
) -> Result<(Item, Vec<TreeItemView>)> {
    let (root, version) = load(store, scope, owner)?;
    if tree::find(&root, folder_id).is_none() {
        return Err(folder_not_found(folder_id));
    }

    let now = Utc::now();
    let item = Item {
        id: input.id.unwrap_or_else(|| new_item_id(now)),
        kind: input.kind,
        name: input.name,
        url: input.url,
        file_name: input.file_name,
        content: input.content,
        author: input.author,
        updated_at: now,
    };
    let next = tree::update_by_id(&root, folder_id, &|node| FolderNode {
        updated_at: Some(now),
        ..tree::upsert_item(node, item.clone())
    });

    let snapshot = commit(store, scope, owner, &next, version)?;
    info!(owner = owner.owner(), folder_id, item_id = %item.id, kind = %item.kind, "tree item written");
    let items = tree::find(&snapshot.root, folder_id)
        .map(item_views)
        .unwrap_or_default();
    Ok((item, items))
}

/// Drops one item from the folder. An unknown item id still rewrites the
/// folder's `updatedAt`.
pub fn delete_item<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    folder_id: &str,
    item_id: &str,
) -> Result<Vec<TreeItemView>> {
    let (root, version) = load(store, scope, owner)?;
    if tree::find(&root, folder_id).is_none() {
        return Err(folder_not_found(folder_id));
    }

    let now = Utc::now();
    let next = tree::update_by_id(&root, folder_id, &|node| FolderNode {
        updated_at: Some(now),
        ..tree::remove_item(node, item_id)
    });

    let snapshot = commit(store, scope, owner, &next, version)?;
    info!(owner = owner.owner(), folder_id, item_id, "tree item deleted");
    Ok(tree::find(&snapshot.root, folder_id)
        .map(item_views)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKind;
    use crate::store::memory::InMemoryStore;
    use std::collections::HashSet;

    fn owner() -> OwnerFilter {
        OwnerFilter::new("room-1")
    }

    #[test]
    fn test_read_missing_tree_does_not_persist() {
        let store = InMemoryStore::new();
        let snap = read(&store, Scope::Local, &owner()).unwrap();
        assert!(snap.root.is_root());
        assert!(snap.root.children.is_empty());
        assert_eq!(snap.version, 0);
        assert!(store.find_tree(Scope::Local, &owner()).unwrap().is_none());
    }

    #[test]
    fn test_create_folder_under_root_and_nested() {
        let mut store = InMemoryStore::new();
        let (_, docs) = create_folder(&mut store, Scope::Local, &owner(), ROOT_ID, "Docs").unwrap();
        let (snap, year) =
            create_folder(&mut store, Scope::Local, &owner(), &docs.id, " 2024 ").unwrap();

        assert_eq!(year.name, "2024");
        assert_eq!(year.parent_id, docs.id);
        assert_eq!(snap.version, 2);

        let found = tree::find(&snap.root, &year.id).unwrap();
        assert_eq!(found.parent_id.as_deref(), Some(docs.id.as_str()));
        assert!(tree::find(&snap.root, &docs.id).unwrap().updated_at.is_some());
    }

    #[test]
    fn test_created_ids_are_unique() {
        let mut store = InMemoryStore::new();
        let mut ids = HashSet::new();
        for i in 0..20 {
            let (snap, f) =
                create_folder(&mut store, Scope::Local, &owner(), ROOT_ID, &format!("F{}", i))
                    .unwrap();
            assert!(tree::find(&snap.root, &f.id).is_some());
            ids.insert(f.id);
        }
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_create_folder_missing_parent() {
        let mut store = InMemoryStore::new();
        let result = create_folder(&mut store, Scope::Local, &owner(), "nope", "X");
        assert!(matches!(result, Err(FolioError::NotFound(_))));
        assert!(store.find_tree(Scope::Local, &owner()).unwrap().is_none());
    }

    #[test]
    fn test_create_folder_blank_name() {
        let mut store = InMemoryStore::new();
        let result = create_folder(&mut store, Scope::Local, &owner(), ROOT_ID, "  ");
        assert!(matches!(result, Err(FolioError::Validation(_))));
    }

    #[test]
    fn test_rename_folder() {
        let mut store = InMemoryStore::new();
        let (_, f) = create_folder(&mut store, Scope::Local, &owner(), ROOT_ID, "Old").unwrap();
        let snap = rename_folder(&mut store, Scope::Local, &owner(), &f.id, "New").unwrap();
        assert_eq!(tree::find(&snap.root, &f.id).unwrap().name, "New");

        let missing = rename_folder(&mut store, Scope::Local, &owner(), "zzz", "X");
        assert!(matches!(missing, Err(FolioError::NotFound(_))));
    }

    #[test]
    fn test_delete_folder_removes_subtree() {
        let mut store = InMemoryStore::new();
        let (_, a) = create_folder(&mut store, Scope::Local, &owner(), ROOT_ID, "A").unwrap();
        let (_, b) = create_folder(&mut store, Scope::Local, &owner(), &a.id, "B").unwrap();
        let (_, d) = create_folder(&mut store, Scope::Local, &owner(), ROOT_ID, "D").unwrap();

        let snap = delete_folder(&mut store, Scope::Local, &owner(), &a.id).unwrap();
        assert!(tree::find(&snap.root, &a.id).is_none());
        assert!(tree::find(&snap.root, &b.id).is_none());
        assert!(tree::find(&snap.root, &d.id).is_some());
        assert!(snap.root.updated_at.is_some());
    }

    #[test]
    fn test_delete_root_rejected() {
        let mut store = InMemoryStore::new();
        let result = delete_folder(&mut store, Scope::Local, &owner(), ROOT_ID);
        assert!(matches!(result, Err(FolioError::Validation(_))));
    }

    #[test]
    fn test_upsert_item_generates_id_and_replaces() {
        let mut store = InMemoryStore::new();
        let (_, f) = create_folder(&mut store, Scope::Local, &owner(), ROOT_ID, "Docs").unwrap();

        let (item, items) = upsert_item(
            &mut store,
            Scope::Local,
            &owner(),
            &f.id,
            ItemInput::text("hello"),
        )
        .unwrap();
        assert!(item.id.starts_with("i-"));
        assert_eq!(items.len(), 1);

        let (_, items) = upsert_item(
            &mut store,
            Scope::Local,
            &owner(),
            &f.id,
            ItemInput::new(ItemKind::Image)
                .with_id(item.id.clone())
                .with_url("https://cdn/x.png"),
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, ItemKind::Image);
        assert_eq!(items[0].file_url.as_deref(), Some("https://cdn/x.png"));
    }

    #[test]
    fn test_items_can_live_on_root() {
        let mut store = InMemoryStore::new();
        upsert_item(&mut store, Scope::Local, &owner(), ROOT_ID, ItemInput::text("top")).unwrap();
        let items = list_items(&store, Scope::Local, &owner(), ROOT_ID).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_delete_item() {
        let mut store = InMemoryStore::new();
        let (_, f) = create_folder(&mut store, Scope::Local, &owner(), ROOT_ID, "Docs").unwrap();
        let (item, _) =
            upsert_item(&mut store, Scope::Local, &owner(), &f.id, ItemInput::text("x")).unwrap();

        let items = delete_item(&mut store, Scope::Local, &owner(), &f.id, &item.id).unwrap();
        assert!(items.is_empty());

        let missing = delete_item(&mut store, Scope::Local, &owner(), "zzz", &item.id);
        assert!(matches!(missing, Err(FolioError::NotFound(_))));
    }

    #[test]
    fn test_stale_write_is_a_conflict() {
        let mut store = InMemoryStore::new();
        create_folder(&mut store, Scope::Local, &owner(), ROOT_ID, "A").unwrap();

        // Another writer read version 1 and wrote before us
        let (root, read_version) = load(&store, Scope::Local, &owner()).unwrap();
        create_folder(&mut store, Scope::Local, &owner(), ROOT_ID, "B").unwrap();

        let stale = commit(&mut store, Scope::Local, &owner(), &root, read_version);
        assert!(matches!(stale, Err(FolioError::Conflict(_))));

        // Winner's data survives
        let snap = read(&store, Scope::Local, &owner()).unwrap();
        assert_eq!(snap.root.children.len(), 2);
    }

    #[test]
    fn test_owners_do_not_share_trees() {
        let mut store = InMemoryStore::new();
        create_folder(&mut store, Scope::Local, &owner(), ROOT_ID, "Mine").unwrap();
        let other = read(&store, Scope::Local, &OwnerFilter::new("room-2")).unwrap();
        assert!(other.root.children.is_empty());
    }

    #[test]
    fn test_write_failure_propagates() {
        let mut store = InMemoryStore::new();
        store.backend.set_simulate_write_error(true);
        let result = create_folder(&mut store, Scope::Local, &owner(), ROOT_ID, "A");
        assert!(matches!(result, Err(FolioError::Store(_))));
    }
}
