//! # Tree Model Engine
//!
//! Pure transforms over an owner's embedded [`FolderNode`] tree. Every function
//! takes the current tree by reference and returns a **new** tree; nothing is
//! mutated in place, so results compare with `==` in tests.
//!
//! An unknown id is never an error here: the tree comes back unchanged. Callers
//! that target a specific id must check with [`find`] first and report
//! not-found themselves (see `commands::tree`).
//!
//! Persisting the result is the caller's job: read the document, transform,
//! write back.

use crate::model::{FolderNode, Item};

/// Depth-first pre-order search. The first match wins.
pub fn find<'a>(root: &'a FolderNode, id: &str) -> Option<&'a FolderNode> {
    if root.id == id {
        return Some(root);
    }
    root.children.iter().find_map(|child| find(child, id))
}

/// Removes every node with `id` (and therefore its subtree) from its parent's
/// children. The root itself is never removed; callers guard against that.
pub fn delete_subtree(root: &FolderNode, id: &str) -> FolderNode {
    let children = root
        .children
        .iter()
        .filter(|c| c.id != id)
        .map(|c| delete_subtree(c, id))
        .collect();
    FolderNode {
        children,
        ..root.clone()
    }
}

/// Replaces the name of the node matching `id`. Timestamps are untouched.
pub fn rename(root: &FolderNode, id: &str, name: &str) -> FolderNode {
    update_by_id(root, id, &|node| FolderNode {
        name: name.to_string(),
        ..node.clone()
    })
}

/// Replaces the item with the same id in place, or appends it.
pub fn upsert_item(node: &FolderNode, item: Item) -> FolderNode {
    let mut items = node.items.clone();
    match items.iter().position(|x| x.id == item.id) {
        Some(idx) => items[idx] = item,
        None => items.push(item),
    }
    FolderNode {
        items,
        ..node.clone()
    }
}

/// Drops the item with `item_id` from one node's items.
pub fn remove_item(node: &FolderNode, item_id: &str) -> FolderNode {
    FolderNode {
        items: node
            .items
            .iter()
            .filter(|x| x.id != item_id)
            .cloned()
            .collect(),
        ..node.clone()
    }
}

/// Applies `patch` at the node matching `id`, rebuilding every ancestor on the
/// way back up. The matched node's subtree is handed to `patch` whole and not
/// searched further.
pub fn update_by_id<F>(root: &FolderNode, id: &str, patch: &F) -> FolderNode
where
    F: Fn(&FolderNode) -> FolderNode,
{
    if root.id == id {
        return patch(root);
    }
    FolderNode {
        children: root
            .children
            .iter()
            .map(|c| update_by_id(c, id, patch))
            .collect(),
        ..root.clone()
    }
}

/// All node ids in pre-order, root included.
pub fn collect_ids(root: &FolderNode) -> Vec<String> {
    let mut ids = Vec::new();
    walk(root, &mut |node| ids.push(node.id.clone()));
    ids
}

/// Visits every node in pre-order.
pub fn walk<'a, F>(root: &'a FolderNode, visit: &mut F)
where
    F: FnMut(&'a FolderNode),
{
    visit(root);
    for child in &root.children {
        walk(child, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Author, ItemKind, ROOT_ID};
    use chrono::{DateTime, Utc};

    fn ts() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    fn node(id: &str, parent: &str, children: Vec<FolderNode>) -> FolderNode {
        let mut n = FolderNode::child(id.into(), id.to_uppercase(), parent.into(), ts());
        n.children = children;
        n
    }

    fn item(id: &str, content: &str) -> Item {
        Item {
            id: id.into(),
            kind: ItemKind::Text,
            name: None,
            url: None,
            file_name: None,
            content: Some(content.into()),
            author: Author::default(),
            updated_at: ts(),
        }
    }

    /// root -> a -> b -> c, root -> d
    fn sample() -> FolderNode {
        let mut root = FolderNode::root(ts());
        root.children = vec![
            node("a", ROOT_ID, vec![node("b", "a", vec![node("c", "b", vec![])])]),
            node("d", ROOT_ID, vec![]),
        ];
        root
    }

    #[test]
    fn test_find_walks_depth_first() {
        let root = sample();
        assert_eq!(find(&root, "c").unwrap().name, "C");
        assert!(find(&root, ROOT_ID).unwrap().is_root());
        assert!(find(&root, "zzz").is_none());
    }

    #[test]
    fn test_find_first_match_in_preorder() {
        let mut root = sample();
        root.children[1].id = "b".into();
        root.children[1].name = "second".into();
        assert_eq!(find(&root, "b").unwrap().name, "B");
    }

    #[test]
    fn test_delete_subtree_removes_descendants() {
        let root = sample();
        let next = delete_subtree(&root, "a");
        assert_eq!(collect_ids(&next), vec![ROOT_ID, "d"]);
        // Untouched sibling is byte-for-byte the same
        assert_eq!(next.children[0], root.children[1]);
    }

    #[test]
    fn test_delete_subtree_chain_leaves_empty_root() {
        let mut root = FolderNode::root(ts());
        root.children = vec![node("a", ROOT_ID, vec![node("b", "a", vec![node("c", "b", vec![])])])];
        let next = delete_subtree(&root, "a");
        assert!(next.children.is_empty());
    }

    #[test]
    fn test_delete_subtree_nested_target() {
        let root = sample();
        let next = delete_subtree(&root, "b");
        assert_eq!(collect_ids(&next), vec![ROOT_ID, "a", "d"]);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let root = sample();
        assert_eq!(delete_subtree(&root, "nope"), root);
    }

    #[test]
    fn test_rename_changes_only_name() {
        let root = sample();
        let next = rename(&root, "b", "Renamed");
        let b = find(&next, "b").unwrap();
        assert_eq!(b.name, "Renamed");
        assert_eq!(b.updated_at, find(&root, "b").unwrap().updated_at);
        assert_eq!(find(&next, "d"), find(&root, "d"));
    }

    #[test]
    fn test_rename_to_same_name_is_identity() {
        let root = sample();
        assert_eq!(rename(&root, "c", "C"), root);
    }

    #[test]
    fn test_rename_unknown_is_noop() {
        let root = sample();
        assert_eq!(rename(&root, "nope", "X"), root);
    }

    #[test]
    fn test_upsert_item_appends_then_replaces_in_place() {
        let folder = node("a", ROOT_ID, vec![]);
        let folder = upsert_item(&folder, item("i1", "one"));
        let folder = upsert_item(&folder, item("i2", "two"));
        let folder = upsert_item(&folder, item("i1", "uno"));

        let ids: Vec<&str> = folder.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["i1", "i2"]);
        assert_eq!(folder.items[0].content.as_deref(), Some("uno"));
    }

    #[test]
    fn test_remove_item() {
        let folder = upsert_item(&node("a", ROOT_ID, vec![]), item("i1", "one"));
        assert!(remove_item(&folder, "i1").items.is_empty());
        assert_eq!(remove_item(&folder, "other"), folder);
    }

    #[test]
    fn test_update_by_id_rebuilds_ancestors() {
        let root = sample();
        let next = update_by_id(&root, "c", &|n| upsert_item(n, item("i1", "deep")));
        let c = find(&next, "c").unwrap();
        assert_eq!(c.items.len(), 1);
        // Original value untouched
        assert!(find(&root, "c").unwrap().items.is_empty());
    }

    #[test]
    fn test_update_by_id_on_root() {
        let root = sample();
        let next = update_by_id(&root, ROOT_ID, &|n| FolderNode {
            updated_at: Some(ts()),
            ..n.clone()
        });
        assert_eq!(next.updated_at, Some(ts()));
        assert_eq!(next.children, root.children);
    }

    #[test]
    fn test_collect_ids_preorder() {
        assert_eq!(collect_ids(&sample()), vec![ROOT_ID, "a", "b", "c", "d"]);
    }
}
