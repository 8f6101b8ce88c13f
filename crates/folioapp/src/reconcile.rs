//! # Client Reconciliation
//!
//! A client holds one flat, scope-tagged copy of whatever it has loaded so far.
//! Server listings are partial (one folder's children) or exhaustive (a whole
//! scope), and each must be **merged** into the local copy rather than replace
//! it:
//!
//! - [`LoadTarget::Recursive`]: the response is authoritative for the scope. All
//!   local records of that scope are dropped first.
//! - [`LoadTarget::Shallow`]: only same-scope records filed directly under the
//!   target are dropped. Siblings, ancestors, and the other scope stay, so
//!   breadcrumbs built from earlier loads keep resolving.
//! - [`LoadTarget::Trash`]: same-scope records currently marked trashed are
//!   dropped and replaced by the server's trash listing.
//!
//! Every merge ends with deduplication by id: the last copy's contents win, the
//! first copy's position is kept.
//!
//! A failed load never touches local state; see [`LocalTree::apply`].

use crate::model::Scope;
use crate::view::{FolderView, ItemView, Listing};
use std::collections::HashMap;

/// What a listing response was loaded for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    Recursive { scope: Scope },
    Shallow { scope: Scope, parent_id: String },
    Trash { scope: Scope },
}

impl LoadTarget {
    pub fn scope(&self) -> Scope {
        match self {
            LoadTarget::Recursive { scope }
            | LoadTarget::Shallow { scope, .. }
            | LoadTarget::Trash { scope } => *scope,
        }
    }
}

/// Accessors the merge needs from both view kinds.
trait Cached {
    fn key(&self) -> &str;
    fn scope(&self) -> Scope;
    fn parent(&self) -> &str;
    fn trashed(&self) -> bool;
}

impl Cached for FolderView {
    fn key(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> Scope {
        self.scope
    }
    fn parent(&self) -> &str {
        &self.parent_id
    }
    fn trashed(&self) -> bool {
        self.trashed_at.is_some()
    }
}

impl Cached for ItemView {
    fn key(&self) -> &str {
        &self.id
    }
    fn scope(&self) -> Scope {
        self.scope
    }
    fn parent(&self) -> &str {
        &self.folder_id
    }
    fn trashed(&self) -> bool {
        self.trashed_at.is_some()
    }
}

fn stale<T: Cached>(record: &T, target: &LoadTarget) -> bool {
    if record.scope() != target.scope() {
        return false;
    }
    match target {
        LoadTarget::Recursive { .. } => true,
        LoadTarget::Shallow { parent_id, .. } => record.parent() == parent_id,
        LoadTarget::Trash { .. } => record.trashed(),
    }
}

fn merge_into<T: Cached>(local: &mut Vec<T>, incoming: Vec<T>, target: &LoadTarget) {
    local.retain(|r| !stale(r, target));
    local.extend(incoming);
    dedupe(local);
}

/// Collapses duplicate ids: the last record's contents land in the first
/// record's slot.
fn dedupe<T: Cached>(records: &mut Vec<T>) {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::with_capacity(records.len());
    for record in records.drain(..) {
        match slots.get(record.key()) {
            Some(&idx) => out[idx] = record,
            None => {
                slots.insert(record.key().to_string(), out.len());
                out.push(record);
            }
        }
    }
    *records = out;
}

/// The client's locally cached namespace, across both scopes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalTree {
    pub folders: Vec<FolderView>,
    pub items: Vec<ItemView>,
}

impl LocalTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, target: &LoadTarget, listing: Listing) {
        merge_into(&mut self.folders, listing.folders, target);
        merge_into(&mut self.items, listing.items, target);
    }

    /// Merges a successful load; an error leaves the cache exactly as it was.
    pub fn apply<E>(&mut self, target: &LoadTarget, response: Result<Listing, E>) -> Result<(), E> {
        let listing = response?;
        self.merge(target, listing);
        Ok(())
    }

    pub fn folder(&self, id: &str) -> Option<&FolderView> {
        self.folders.iter().find(|f| f.id == id)
    }

    /// Path from the top-level ancestor down to `folder_id`, built from loaded
    /// folders only. Stops at the first parent that is not loaded (or the root).
    pub fn breadcrumbs(&self, folder_id: &str) -> Vec<&FolderView> {
        let mut path = Vec::new();
        let mut current = Some(folder_id);
        while let Some(id) = current {
            let Some(folder) = self.folder(id) else {
                break;
            };
            // A corrupt parent loop would otherwise never end
            if path.iter().any(|f: &&FolderView| f.id == folder.id) {
                break;
            }
            path.push(folder);
            current = Some(folder.parent_id.as_str());
        }
        path.reverse();
        path
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

    fn folder(id: &str, parent: &str, scope: Scope) -> FolderView {
        FolderView {
            id: id.into(),
            name: id.to_uppercase(),
            parent_id: parent.into(),
            scope,
            author: Author::default(),
            starred: false,
            trashed_at: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn item(id: &str, folder_id: &str, scope: Scope) -> ItemView {
        ItemView {
            id: id.into(),
            folder_id: folder_id.into(),
            kind: ItemKind::Text,
            name: Some(id.into()),
            url: None,
            file_name: None,
            content: None,
            scope,
            author: Author::default(),
            starred: false,
            trashed_at: None,
            created_at: ts(),
            updated_at: ts(),
        }
    }

    fn ids<T: Cached>(records: &[T]) -> Vec<&str> {
        records.iter().map(|r| r.key()).collect()
    }

    fn shallow(parent: &str) -> LoadTarget {
        LoadTarget::Shallow {
            scope: Scope::Local,
            parent_id: parent.into(),
        }
    }

    fn loaded() -> LocalTree {
        LocalTree {
            folders: vec![
                folder("x1", "X", Scope::Local),
                folder("y1", "Y", Scope::Local),
                folder("gx", "X", Scope::Global),
            ],
            items: vec![item("xi", "X", Scope::Local), item("yi", "Y", Scope::Local)],
        }
    }

    #[test]
    fn test_shallow_replaces_only_target_children() {
        let mut local = loaded();
        local.merge(
            &shallow("X"),
            Listing {
                folders: vec![folder("x2", "X", Scope::Local)],
                items: vec![],
            },
        );

        assert_eq!(ids(&local.folders), vec!["y1", "gx", "x2"]);
        assert_eq!(ids(&local.items), vec!["yi"]);
    }

    #[test]
    fn test_recursive_replaces_whole_scope() {
        let mut local = loaded();
        local.merge(
            &LoadTarget::Recursive {
                scope: Scope::Local,
            },
            Listing {
                folders: vec![folder("n1", ROOT_ID, Scope::Local)],
                items: vec![],
            },
        );
        assert_eq!(ids(&local.folders), vec!["gx", "n1"]);
        assert!(local.items.is_empty());
    }

    #[test]
    fn test_trash_load_replaces_trashed_only() {
        let mut local = loaded();
        local.folders[1].trashed_at = Some(ts());

        let mut fresh = folder("t2", "X", Scope::Local);
        fresh.trashed_at = Some(ts());
        local.merge(
            &LoadTarget::Trash {
                scope: Scope::Local,
            },
            Listing {
                folders: vec![fresh],
                items: vec![],
            },
        );
        assert_eq!(ids(&local.folders), vec!["x1", "gx", "t2"]);
    }

    #[test]
    fn test_dedupe_last_write_wins_first_position_kept() {
        let mut local = loaded();
        let mut renamed = folder("y1", "X", Scope::Local);
        renamed.name = "Moved".into();
        local.merge(
            &shallow("X"),
            Listing {
                folders: vec![renamed],
                items: vec![],
            },
        );
        // y1 used to sit under Y; the fresh copy lands in its original slot
        assert_eq!(ids(&local.folders), vec!["y1", "gx"]);
        assert_eq!(local.folders[0].name, "Moved");
        assert_eq!(local.folders[0].parent_id, "X");
    }

    #[test]
    fn test_overlapping_shallow_loads_do_not_duplicate() {
        let mut local = LocalTree::new();
        let listing = Listing {
            folders: vec![folder("a", ROOT_ID, Scope::Local)],
            items: vec![item("i", ROOT_ID, Scope::Local)],
        };
        local.merge(&shallow(ROOT_ID), listing.clone());
        local.merge(&shallow(ROOT_ID), listing);
        assert_eq!(local.folders.len(), 1);
        assert_eq!(local.items.len(), 1);
    }

    #[test]
    fn test_failed_load_leaves_state_untouched() {
        let mut local = loaded();
        let before = local.clone();
        let result = local.apply(&shallow("X"), Err::<Listing, &str>("offline"));
        assert_eq!(result, Err("offline"));
        assert_eq!(local, before);
    }

    #[test]
    fn test_breadcrumbs_follow_loaded_ancestors() {
        let local = LocalTree {
            folders: vec![
                folder("docs", ROOT_ID, Scope::Local),
                folder("y2024", "docs", Scope::Local),
                folder("q1", "y2024", Scope::Local),
            ],
            items: vec![],
        };
        let trail: Vec<&str> = local
            .breadcrumbs("q1")
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(trail, vec!["docs", "y2024", "q1"]);
        assert!(local.breadcrumbs("unknown").is_empty());
    }

    #[test]
    fn test_breadcrumbs_stop_at_unloaded_parent() {
        let local = LocalTree {
            folders: vec![folder("leaf", "missing", Scope::Local)],
            items: vec![],
        };
        assert_eq!(local.breadcrumbs("leaf").len(), 1);
    }
}
