//! Undo of [`super::trash`].
//!
//! A restored record whose parent folder no longer exists (legacy or hand-edited
//! data) would be unreachable, so it is re-homed at the root.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{RecordPatch, Scope, ROOT_ID};
use crate::owner::OwnerFilter;
use crate::store::{DataStore, RecordQuery};
use crate::view::{FolderView, ItemView};
use chrono::Utc;
use tracing::info;

use super::helpers::{patch_folder, patch_item, require_folder, require_item};

fn parent_exists<S: DataStore>(
    store: &S,
    scope: Scope,
    owner: &OwnerFilter,
    parent_id: &str,
) -> Result<bool> {
    if parent_id == ROOT_ID {
        return Ok(true);
    }
    Ok(!store
        .find_folders(scope, owner, &RecordQuery::by_id(parent_id))?
        .is_empty())
}

fn restore_patch<S: DataStore>(
    store: &S,
    scope: Scope,
    owner: &OwnerFilter,
    parent_id: &str,
) -> Result<(RecordPatch, bool)> {
    let mut patch = RecordPatch::restore(Utc::now());
    let rehomed = !parent_exists(store, scope, owner, parent_id)?;
    if rehomed {
        patch.parent = Some(ROOT_ID.to_string());
    }
    Ok((patch, rehomed))
}

pub fn folder<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    folder_id: &str,
) -> Result<CmdResult> {
    let current = require_folder(store, scope, owner, folder_id)?;
    let (patch, rehomed) = restore_patch(store, scope, owner, &current.parent_id)?;
    let record = patch_folder(store, scope, owner, folder_id, &patch)?;
    info!(owner = owner.owner(), folder_id, rehomed, "folder restored");

    let mut result = CmdResult::default().with_folders(vec![FolderView::from(&record)]);
    result.add_message(CmdMessage::success(format!("Restored: {}", record.name)));
    if rehomed {
        result.add_message(CmdMessage::info("Original parent is gone; restored to root"));
    }
    Ok(result)
}

pub fn item<S: DataStore>(
    store: &mut S,
    scope: Scope,
    owner: &OwnerFilter,
    item_id: &str,
) -> Result<CmdResult> {
    let current = require_item(store, scope, owner, item_id)?;
    let (patch, rehomed) = restore_patch(store, scope, owner, &current.folder_id)?;
    let record = patch_item(store, scope, owner, item_id, &patch)?;
    info!(owner = owner.owner(), item_id, rehomed, "item restored");

    let view = ItemView::from(&record);
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Restored: {}", view.label())));
    if rehomed {
        result.add_message(CmdMessage::info("Original folder is gone; restored to root"));
    }
    Ok(result.with_items(vec![view]))
}
