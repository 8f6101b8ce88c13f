//! Permanent deletion.
//!
//! Purging a folder removes its whole subtree, trashed or not. The descendant
//! closure is collected first, then items filed anywhere in it are deleted,
//! then the folders themselves. The two deletes are separate writes: a failure
//! in between leaves empty folders behind, never folder-less items.

use crate::commands::{CmdMessage, CmdResult, RecordCounts};
use crate::error::Result;
use crate::model::Scope;
use crate::owner::OwnerFilter;
use crate::store::{DataStore, RecordQuery};
use tracing::info;

use super::helpers::{descendant_folder_ids, require_folder, require_item};

pub fn folder<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    folder_id: &str,
) -> Result<CmdResult> {
    let target = require_folder(store, scope, owner, folder_id)?;
    let closure = descendant_folder_ids(store, scope, owner, folder_id)?;

    let items = store.delete_items(scope, owner, &RecordQuery::children_of(closure.iter().cloned()))?;
    let folders = store.delete_folders(scope, owner, &RecordQuery::by_ids(closure))?;
    info!(owner = owner.owner(), folder_id, folders, items, "folder purged");

    let mut result = CmdResult::default().with_counts(RecordCounts { folders, items });
    result.add_message(CmdMessage::success(format!("Purged: {}", target.name)));
    if folders > 1 || items > 0 {
        result.add_message(CmdMessage::info(format!(
            "And purged {} subfolder(s) and {} item(s)",
            folders.saturating_sub(1),
            items
        )));
    }
    Ok(result)
}

pub fn item<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    item_id: &str,
) -> Result<CmdResult> {
    require_item(store, scope, owner, item_id)?;
    let items = store.delete_items(scope, owner, &RecordQuery::by_id(item_id))?;
    info!(owner = owner.owner(), item_id, "item purged");

    let mut result = CmdResult::default().with_counts(RecordCounts { folders: 0, items });
    result.add_message(CmdMessage::success(format!("Purged item {}", item_id)));
    Ok(result)
}
